//! Age-binned statistics and CV trend detection

pub mod aggregate;
pub mod binning;
pub mod correlation;
pub mod descriptive;
pub mod trend;

pub use aggregate::{AgeBinnedAggregator, BiomarkerKey};
pub use binning::AgeBin;
pub use correlation::{Spearman, spearman};
pub use descriptive::{mean, ols_slope, quantile_sorted, sample_std};
pub use trend::TrendDetector;
