//! Biomarker catalog records

use serde::{Deserialize, Serialize};

/// Provenance of one kept pooled biomarker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub biomarker_id: String,
    pub biomarker_name: String,
    pub unit: String,
    pub source_file_count: usize,
    /// Sorted, pipe-joined data file names
    pub source_files: String,
    pub source_variable_count: usize,
    /// Sorted, pipe-joined variable names
    pub source_variables: String,
}
