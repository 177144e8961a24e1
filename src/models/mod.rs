//! Typed records flowing through the pipeline
//!
//! Manifest and cohort rows come from external collaborators; everything else
//! is derived by the pooling, screening and statistics algorithms.

pub mod catalog;
pub mod cohort;
pub mod manifest;
pub mod observation;
pub mod pooling;
pub mod screening;
pub mod statistics;

pub use catalog::CatalogEntry;
pub use cohort::{CohortMember, CohortTable};
pub use manifest::{ManifestRow, RawVariable, SourceFile, SourceFileMeta, VariableManifest};
pub use observation::{HarmonizedObservation, Sex};
pub use pooling::{ConversionStatus, PoolingEntry, PoolingMap};
pub use screening::{ScreenReason, ScreenRecord, ScreeningSummary};
pub use statistics::{BinStatistic, Stratum, TrendMetric};
