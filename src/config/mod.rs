//! Configuration for the biomarker pipeline.
//!
//! Every threshold used by screening, binning and trend detection lives here
//! so the algorithms can be exercised in isolation with non-default values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BiomarkerError, Result};
use crate::error::util::safe_open_file;
use crate::utils::io::parquet::{DEFAULT_BATCH_SIZE, get_batch_size};

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Variable manifest (Parquet)
    pub manifest: PathBuf,
    /// Cohort eligibility table (Parquet)
    pub cohort: PathBuf,
    /// Root of per-cycle data files, laid out as `{raw_dir}/{cycle}/{file}.parquet`
    pub raw_dir: PathBuf,
    /// Directory receiving all outputs
    pub out_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("data/processed/lab_variable_manifest.parquet"),
            cohort: PathBuf::from("data/processed/participant_health_flags.parquet"),
            raw_dir: PathBuf::from("data/raw"),
            out_dir: PathBuf::from("data/processed"),
        }
    }
}

/// Thresholds for the variable screener and its continuity test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Minimum non-missing values for a column to count as continuous
    pub min_non_missing: usize,
    /// Minimum distinct values for a column to count as continuous
    pub min_distinct: usize,
    /// Tolerance when deciding whether a value is integer-valued
    pub integer_tolerance: f64,
    /// Integer-valued fraction above which a low-cardinality column is treated as coded
    pub max_integer_fraction: f64,
    /// Distinct-value ceiling for the coded-field check
    pub max_integer_distinct: usize,
    /// Distinct/n fraction below which a low-cardinality column is near-constant
    pub min_distinct_fraction: f64,
    /// Distinct-value ceiling for the near-constant check
    pub near_constant_distinct: usize,
    /// Subject identifier column present in every data file
    pub subject_id_column: String,
    /// Prefix marking sampling-weight columns
    pub weight_prefix: String,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            min_non_missing: 30,
            min_distinct: 8,
            integer_tolerance: 1e-12,
            max_integer_fraction: 0.995,
            max_integer_distinct: 12,
            min_distinct_fraction: 0.01,
            near_constant_distinct: 20,
            subject_id_column: "SEQN".to_string(),
            weight_prefix: "WT".to_string(),
        }
    }
}

/// Thresholds for age-binned aggregation and the trend detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Minimum observations for a bin to count toward trends
    pub min_bin_n: usize,
    /// Minimum eligible bins before a decline can be flagged
    pub min_trend_bins: usize,
    /// Two-sided significance level for the Spearman test
    pub significance_level: f64,
    /// Bins whose |mean| falls below this have undefined CV and are dropped
    pub mean_epsilon: f64,
    /// Also aggregate each sex separately
    pub stratify_by_sex: bool,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            min_bin_n: 30,
            min_trend_bins: 5,
            significance_level: 0.05,
            mean_epsilon: 1e-8,
            stratify_by_sex: true,
        }
    }
}

/// Configuration for a full pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub screening: ScreeningConfig,
    pub statistics: StatisticsConfig,
    /// Worker threads for per-biomarker statistics (defaults to the CPU count)
    pub threads: Option<usize>,
    /// Parquet read batch size
    pub batch_size: usize,
    /// Show a progress bar while materializing files
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            screening: ScreeningConfig::default(),
            statistics: StatisticsConfig::default(),
            threads: None,
            batch_size: get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE),
            show_progress: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = safe_open_file(path, "pipeline configuration")?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the manifest path
    #[must_use]
    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.manifest = path.into();
        self
    }

    /// Set the cohort table path
    #[must_use]
    pub fn with_cohort(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.cohort = path.into();
        self
    }

    /// Set the raw data root
    #[must_use]
    pub fn with_raw_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.raw_dir = path.into();
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn with_out_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.out_dir = path.into();
        self
    }

    /// Set the worker thread count
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Enable or disable the progress bar
    #[must_use]
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Number of worker threads to use
    #[must_use]
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Reject settings no run could use
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(BiomarkerError::Config("batch_size must be positive".into()));
        }
        if self.threads == Some(0) {
            return Err(BiomarkerError::Config("threads must be positive".into()));
        }
        let alpha = self.statistics.significance_level;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(BiomarkerError::Config(format!(
                "significance_level must be in (0, 1), got {alpha}"
            )));
        }
        if self.statistics.min_trend_bins < 2 {
            return Err(BiomarkerError::Config(
                "min_trend_bins must be at least 2".into(),
            ));
        }
        if self.screening.subject_id_column.is_empty() {
            return Err(BiomarkerError::Config(
                "subject_id_column must not be empty".into(),
            ));
        }
        Ok(())
    }
}
