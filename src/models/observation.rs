//! Harmonized observations

use std::fmt;

use serde::{Deserialize, Serialize};

/// Participant sex as coded in the demographics files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl From<i32> for Sex {
    fn from(value: i32) -> Self {
        match value {
            1 => Sex::Male,
            2 => Sex::Female,
            _ => Sex::Unknown,
        }
    }
}

impl Sex {
    /// Parse either a numeric code (`1`/`2`) or a label (`Male`/`Female`)
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "1" | "1.0" | "male" | "m" => Sex::Male,
            "2" | "2.0" | "female" | "f" => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One subject's value for one pooled biomarker
///
/// `value` is always expressed in `unit`, the pooled unit of `biomarker_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonizedObservation {
    pub subject_id: i64,
    pub age_years: f64,
    pub sex: Sex,
    pub cycle_label: String,
    pub cycle_start_year: i32,
    pub cycle_end_year: i32,
    pub biomarker_id: String,
    pub variable_name: String,
    pub biomarker_name: String,
    pub source_file: String,
    pub value: f64,
    pub unit: String,
    pub healthy_flag: bool,
    pub exclusion_reason: String,
}
