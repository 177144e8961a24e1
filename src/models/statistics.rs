//! Age-binned statistics and trend records

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::observation::Sex;

/// Sub-population a statistic was computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stratum {
    All,
    Male,
    Female,
}

impl Stratum {
    /// Stratum of a single sex, `None` for unknown sex
    #[must_use]
    pub fn for_sex(sex: Sex) -> Option<Self> {
        match sex {
            Sex::Male => Some(Stratum::Male),
            Sex::Female => Some(Stratum::Female),
            Sex::Unknown => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stratum::All => "all",
            Stratum::Male => "male",
            Stratum::Female => "female",
        }
    }
}

impl fmt::Display for Stratum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distribution of one biomarker within one age bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinStatistic {
    pub biomarker_id: String,
    pub biomarker_name: String,
    pub unit: String,
    pub stratum: Stratum,
    pub age_bin: String,
    pub age_mid: f64,
    pub n: usize,
    pub mean: f64,
    pub std: f64,
    pub cv: f64,
    pub p2_5: f64,
    pub p97_5: f64,
    pub ci95_low: f64,
    pub ci95_high: f64,
    pub passes_n_threshold: bool,
}

/// Age trend of the coefficient of variation for one biomarker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendMetric {
    pub biomarker_id: String,
    pub biomarker_name: String,
    pub stratum: Stratum,
    pub n_bins: usize,
    pub spearman_rho: Option<f64>,
    pub spearman_p: Option<f64>,
    pub linear_slope_cv_per_year: Option<f64>,
    pub linear_slope_logcv_per_year: Option<f64>,
    pub decline_flag: bool,
}
