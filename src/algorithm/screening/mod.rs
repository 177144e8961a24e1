//! Variable screening
//!
//! Decides, per `(file, variable)` pair, whether the variable is analytically
//! usable. Rules are checked in a fixed order and the first match supplies the
//! exclusion reason:
//!
//! 1. `missing_in_file`: the column is absent from the data file
//! 2. `id_or_weight`: subject identifier or sampling weight
//! 3. `comment_or_code`: QC, comment, status or questionnaire field
//! 4. `no_pool_map`: the variable was never pooled
//! 5. `non_continuous_numeric`: fails the continuity test
//! 6. `no_healthy_data`: nothing left after joining to the healthy cohort
//!
//! Screening is deterministic: identical inputs always yield identical reasons.

pub mod continuity;
pub mod rules;

pub use continuity::{ContinuityFailure, ContinuityProfile, ContinuityTest};
pub use rules::{COMMENT_OR_CODE_PATTERNS, ScreeningRules};

use log::trace;

use crate::config::ScreeningConfig;
use crate::models::pooling::{PoolingEntry, PoolingMap};
use crate::models::screening::ScreenReason;

/// Screens variables against name rules, the pooling map and their data
#[derive(Debug, Clone)]
pub struct VariableScreener<'a> {
    rules: ScreeningRules,
    continuity: ContinuityTest,
    pooling: &'a PoolingMap,
}

impl<'a> VariableScreener<'a> {
    #[must_use]
    pub fn new(rules: ScreeningRules, continuity: ContinuityTest, pooling: &'a PoolingMap) -> Self {
        Self {
            rules,
            continuity,
            pooling,
        }
    }

    /// Screener with the built-in rule table and thresholds from config
    #[must_use]
    pub fn from_config(config: &ScreeningConfig, pooling: &'a PoolingMap) -> Self {
        Self::new(
            ScreeningRules::new(&config.subject_id_column, &config.weight_prefix),
            ContinuityTest::from_config(config),
            pooling,
        )
    }

    /// Apply rules 1 to 5
    ///
    /// `column` is the variable's numeric data in the file, `None` when the
    /// file has no such column. On success the variable's pooling entry is
    /// returned.
    pub fn screen(
        &self,
        variable_name: &str,
        variable_desc: &str,
        column: Option<&[Option<f64>]>,
    ) -> Result<&'a PoolingEntry, ScreenReason> {
        let Some(values) = column else {
            return Err(ScreenReason::MissingInFile);
        };
        if self.rules.is_id_or_weight(variable_name) {
            return Err(ScreenReason::IdOrWeight);
        }
        if let Some(pattern) = self.rules.matching_comment_pattern(variable_name, variable_desc) {
            trace!("{variable_name} matches comment pattern {pattern}");
            return Err(ScreenReason::CommentOrCode);
        }
        let Some(entry) = self.pooling.get(variable_name) else {
            return Err(ScreenReason::NoPoolMap);
        };
        if let Err(failure) = self.continuity.evaluate(&self.continuity.profile(values)) {
            trace!("{variable_name} is not continuous: {failure:?}");
            return Err(ScreenReason::NonContinuousNumeric);
        }
        Ok(entry)
    }

    /// Apply rule 6 to the number of rows that survived the cohort join
    pub fn check_healthy_rows(&self, healthy_rows: usize) -> Result<(), ScreenReason> {
        if healthy_rows == 0 {
            Err(ScreenReason::NoHealthyData)
        } else {
            Ok(())
        }
    }
}
