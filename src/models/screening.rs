//! Screening outcomes

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a `(file, variable)` pair was excluded from the harmonized table
///
/// Variants are listed in the order the screener checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenReason {
    MissingInFile,
    IdOrWeight,
    CommentOrCode,
    NoPoolMap,
    NonContinuousNumeric,
    NoHealthyData,
}

impl ScreenReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScreenReason::MissingInFile => "missing_in_file",
            ScreenReason::IdOrWeight => "id_or_weight",
            ScreenReason::CommentOrCode => "comment_or_code",
            ScreenReason::NoPoolMap => "no_pool_map",
            ScreenReason::NonContinuousNumeric => "non_continuous_numeric",
            ScreenReason::NoHealthyData => "no_healthy_data",
        }
    }
}

impl fmt::Display for ScreenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the screening report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenRecord {
    pub cycle_start_year: i32,
    pub data_file_name: String,
    pub variable_name: String,
    pub variable_desc: String,
    pub kept: bool,
    /// Empty when kept
    pub reason: String,
    /// Set when kept
    pub pooled_id: Option<String>,
}

impl ScreenRecord {
    /// Parsed exclusion reason, `None` for kept variables
    #[must_use]
    pub fn screen_reason(&self) -> Option<ScreenReason> {
        if self.kept {
            return None;
        }
        [
            ScreenReason::MissingInFile,
            ScreenReason::IdOrWeight,
            ScreenReason::CommentOrCode,
            ScreenReason::NoPoolMap,
            ScreenReason::NonContinuousNumeric,
            ScreenReason::NoHealthyData,
        ]
        .into_iter()
        .find(|r| r.as_str() == self.reason)
    }
}

/// Tally of screening outcomes for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningSummary {
    pub screened: usize,
    pub kept: usize,
    pub excluded_by_reason: BTreeMap<String, usize>,
}

impl ScreeningSummary {
    #[must_use]
    pub fn from_records(records: &[ScreenRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.screened += 1;
            if record.kept {
                summary.kept += 1;
            } else {
                *summary
                    .excluded_by_reason
                    .entry(record.reason.clone())
                    .or_insert(0) += 1;
            }
        }
        summary
    }
}
