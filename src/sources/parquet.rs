//! Parquet-backed column source
//!
//! Data files live at `{raw_dir}/{cycle_start_year}/{data_file_name}.parquet`.

use std::path::PathBuf;

use itertools::Itertools;
use log::{debug, warn};

use crate::error::{BiomarkerError, Result};
use crate::models::manifest::SourceFile;
use crate::sources::{ColumnSource, FileColumns};
use crate::utils::arrow::{f64_column, i64_column};
use crate::utils::io::parquet::{read_parquet, read_parquet_schema};

/// Reads data files converted to Parquet, one directory per cycle
#[derive(Debug, Clone)]
pub struct ParquetColumnSource {
    raw_dir: PathBuf,
    subject_id_column: String,
    batch_size: usize,
}

impl ParquetColumnSource {
    #[must_use]
    pub fn new(
        raw_dir: impl Into<PathBuf>,
        subject_id_column: impl Into<String>,
        batch_size: usize,
    ) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            subject_id_column: subject_id_column.into(),
            batch_size,
        }
    }

    /// Location of a data file under the raw directory
    #[must_use]
    pub fn file_path(&self, file: &SourceFile) -> PathBuf {
        self.raw_dir
            .join(file.cycle_start_year.to_string())
            .join(format!("{}.parquet", file.data_file_name))
    }
}

impl ColumnSource for ParquetColumnSource {
    fn source_name(&self) -> &'static str {
        "parquet"
    }

    /// Load the subject ids and the requested numeric columns of one file
    ///
    /// Column presence comes from the file schema, so a file without rows
    /// still yields its (empty) columns. A column that cannot be read as
    /// numbers becomes all missing rather than failing the whole file.
    fn load_file(&self, file: &SourceFile, variables: &[&str]) -> Result<Option<FileColumns>> {
        let path = self.file_path(file);
        if !path.is_file() {
            debug!("Data file {file} not found at {}", path.display());
            return Ok(None);
        }

        let table = file.to_string();
        let schema = read_parquet_schema(&path)?;
        if schema.index_of(&self.subject_id_column).is_err() {
            return Err(BiomarkerError::column_not_found(&self.subject_id_column, table));
        }

        let projection = std::iter::once(self.subject_id_column.as_str())
            .chain(variables.iter().copied())
            .unique()
            .collect_vec();
        let batches = read_parquet(&path, Some(projection.as_slice()), self.batch_size)?;

        let mut subject_ids = Vec::new();
        for batch in &batches {
            subject_ids.extend(
                i64_column(batch, &self.subject_id_column, true, &table)?.unwrap_or_default(),
            );
        }

        let mut columns = FileColumns::new(subject_ids);
        for &name in variables {
            if name == self.subject_id_column {
                let ids = columns.subject_ids().iter().map(|id| id.map(|v| v as f64)).collect();
                columns.insert(name, ids)?;
                continue;
            }
            if schema.index_of(name).is_err() {
                continue;
            }
            let mut values = Vec::with_capacity(columns.len());
            for batch in &batches {
                match f64_column(batch, name, true, &table) {
                    Ok(part) => values.extend(part.unwrap_or_default()),
                    Err(e) => {
                        warn!(
                            "Column {name} of {file} is not numeric, treating it as missing: {e}"
                        );
                        values = vec![None; columns.len()];
                        break;
                    }
                }
            }
            columns.insert(name, values)?;
        }

        Ok(Some(columns))
    }
}
