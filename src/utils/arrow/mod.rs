//! Arrow data handling utilities
//!
//! Helpers for pulling typed columns out of record batches with consistent
//! casting and missing-column handling.

pub mod array_utils;
pub mod extractors;

pub use array_utils::{downcast_array, get_column};
pub use extractors::{bool_column, f64_column, i64_column, string_column};
