//! Harmonization and statistics algorithms
//!
//! Label parsing and unit handling feed the pooling map builder; screening
//! and materialization turn raw files into a harmonized long table; the
//! statistics module summarizes that table by age.

pub mod candidates;
pub mod catalog;
pub mod labels;
pub mod materialize;
pub mod pooling;
pub mod screening;
pub mod statistics;
pub mod units;

pub use catalog::build_catalog;
pub use labels::{SplitLabel, normalize_base_name, split_label};
pub use materialize::{LongTable, LongTableMaterializer};
pub use pooling::{LabeledVariable, build_pooling_map, compat_key_for};
pub use screening::{ContinuityTest, ScreeningRules, VariableScreener};
pub use statistics::{AgeBin, AgeBinnedAggregator, TrendDetector};
pub use units::{
    UnitSignature, conversion_factor, convert_value, normalize_unit, parse_unit_signature,
};
