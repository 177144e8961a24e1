//! Utilities shared by the pipeline
//!
//! Arrow column extraction, Parquet reading and writing, and logging helpers.

pub mod arrow;
pub mod io;
pub mod logging;
