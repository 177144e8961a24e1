//! Data sources at the pipeline boundary
//!
//! Raw per-cycle data files are reached through [`ColumnSource`], so the
//! materializer runs the same against Parquet files on disk and in-memory
//! tables in tests. The manifest and cohort readers turn their Parquet
//! tables into typed records.

pub mod cohort;
pub mod manifest;
pub mod memory;
pub mod parquet;

pub use cohort::read_cohort;
pub use manifest::read_manifest;
pub use memory::MemoryColumnSource;
pub use parquet::ParquetColumnSource;

use rustc_hash::FxHashMap;

use crate::error::{BiomarkerError, Result};
use crate::models::manifest::SourceFile;

/// Numeric columns of one data file, aligned by row with the subject ids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileColumns {
    subject_ids: Vec<Option<i64>>,
    columns: FxHashMap<String, Vec<Option<f64>>>,
}

impl FileColumns {
    #[must_use]
    pub fn new(subject_ids: Vec<Option<i64>>) -> Self {
        Self {
            subject_ids,
            columns: FxHashMap::default(),
        }
    }

    /// Add a column; its length must match the subject id column
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        if values.len() != self.subject_ids.len() {
            return Err(BiomarkerError::Schema(format!(
                "column '{name}' has {} rows, expected {}",
                values.len(),
                self.subject_ids.len()
            )));
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Builder form of [`FileColumns::insert`]
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self> {
        self.insert(name, values)?;
        Ok(self)
    }

    #[must_use]
    pub fn subject_ids(&self) -> &[Option<i64>] {
        &self.subject_ids
    }

    /// Values of a column, `None` when the file has no such column
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.subject_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subject_ids.is_empty()
    }
}

/// Provider of raw data-file columns
pub trait ColumnSource: Send + Sync {
    /// Short name used in log messages
    fn source_name(&self) -> &'static str;

    /// Load the subject ids and the requested numeric columns of a file
    ///
    /// Returns `Ok(None)` when the file is not available. Requested columns
    /// that the file lacks are simply absent from the result. A file without
    /// the subject id column is an error.
    fn load_file(&self, file: &SourceFile, variables: &[&str]) -> Result<Option<FileColumns>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_must_align_with_subject_ids() {
        let mut cols = FileColumns::new(vec![Some(1), Some(2)]);
        assert!(cols.insert("LBXA", vec![Some(1.0), None]).is_ok());
        assert!(cols.insert("LBXB", vec![Some(1.0)]).is_err());
        assert_eq!(cols.column("LBXA"), Some(&[Some(1.0), None][..]));
        assert!(cols.column("LBXB").is_none());
        assert_eq!(cols.len(), 2);
    }
}
