//! IO utilities for file operations
//!
//! Reading input tables from Parquet and writing typed result records back.

pub mod parquet;

pub use parquet::{
    DEFAULT_BATCH_SIZE, get_batch_size, read_parquet, read_parquet_schema, write_records,
};
