//! Harmonization of laboratory biomarkers across survey cycles.
//!
//! Variables are pooled from their free-text labels, screened for analytic
//! usability, converted to a shared unit per pooled biomarker and summarized
//! by age bin to test whether variability declines with age.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod utils;

// Core types
pub use config::{PipelineConfig, ScreeningConfig, StatisticsConfig};
pub use error::{BiomarkerError, Result};
pub use pipeline::{Pipeline, PipelineOutputs, RunSummary};

// Algorithms
pub use algorithm::{
    AgeBin, AgeBinnedAggregator, LongTableMaterializer, TrendDetector, VariableScreener,
    build_catalog, build_pooling_map, conversion_factor, normalize_base_name, normalize_unit,
    parse_unit_signature, split_label,
};

// Sources
pub use sources::{ColumnSource, FileColumns, MemoryColumnSource, ParquetColumnSource};

// Arrow types
pub use arrow::record_batch::RecordBatch;

// Utility functions
pub use utils::io::{DEFAULT_BATCH_SIZE, read_parquet, write_records};
