//! Error handling for the biomarker pipeline.
//!
//! Only dataset-wide structural problems surface as errors. Per-variable
//! problems (unparseable units, missing columns, empty cohort joins) are
//! recorded as screening outcomes instead.

pub mod util;

use std::io;
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for the biomarker pipeline
#[derive(Debug, thiserror::Error)]
pub enum BiomarkerError {
    /// Error opening, reading or writing a file
    #[error("IO error: {message}{}", path_suffix(.path.as_deref()))]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<io::Error>,
    },

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error converting records to or from Arrow
    #[error("Record conversion error: {0}")]
    Conversion(#[from] serde_arrow::Error),

    /// Error reading or writing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is absent from an input table
    #[error("Column '{column}' not found in {table}")]
    ColumnNotFound { column: String, table: String },

    /// An input table has an unexpected shape
    #[error("Schema error: {0}")]
    Schema(String),

    /// An input that the run cannot do without is empty
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

fn path_suffix(path: Option<&Path>) -> String {
    path.map(|p| format!(" ({})", p.display())).unwrap_or_default()
}

impl BiomarkerError {
    /// Create an IO error with a message and no underlying source
    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create an IO error wrapping an underlying `io::Error`
    pub fn io_error_with_source(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
            source: Some(source),
        }
    }

    /// Attach a path to an IO error; other variants are returned unchanged
    #[must_use]
    pub fn with_path(self, path: impl AsRef<Path>) -> Self {
        match self {
            Self::Io {
                message, source, ..
            } => Self::Io {
                message,
                path: Some(path.as_ref().to_path_buf()),
                source,
            },
            other => other,
        }
    }

    /// Prefix the message of an IO error with extra context
    #[must_use]
    pub fn context(self, context: impl AsRef<str>) -> Self {
        match self {
            Self::Io {
                message,
                path,
                source,
            } => Self::Io {
                message: format!("{message}: {}", context.as_ref()),
                path,
                source,
            },
            other => other,
        }
    }

    /// Create a missing-column error
    pub fn column_not_found(column: impl Into<String>, table: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
            table: table.into(),
        }
    }
}

impl From<io::Error> for BiomarkerError {
    fn from(error: io::Error) -> Self {
        Self::io_error_with_source(error.to_string(), error)
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, BiomarkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display_includes_path_and_context() {
        let err = BiomarkerError::io_error("File not found")
            .with_path("/tmp/missing.parquet")
            .context("Needed for: cohort table");
        let text = err.to_string();
        assert!(text.contains("File not found: Needed for: cohort table"));
        assert!(text.contains("/tmp/missing.parquet"));
    }

    #[test]
    fn column_not_found_names_table() {
        let err = BiomarkerError::column_not_found("age_years", "cohort table");
        assert_eq!(err.to_string(), "Column 'age_years' not found in cohort table");
    }
}
