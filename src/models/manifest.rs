//! Variable manifest records
//!
//! The manifest lists every (data file, variable) pair published across
//! survey cycles, with the free-text label the pooling builder parses.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{BiomarkerError, Result};

/// One row of the variable manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRow {
    pub cycle_label: String,
    pub cycle_start_year: i32,
    pub cycle_end_year: i32,
    pub data_file_name: String,
    pub data_file_desc: String,
    pub xpt_url: String,
    pub variable_name: String,
    pub variable_desc: String,
    pub use_constraints: String,
    pub is_blood_candidate: bool,
}

impl ManifestRow {
    /// Key of the data file this row belongs to
    #[must_use]
    pub fn source_file(&self) -> SourceFile {
        SourceFile::new(self.cycle_start_year, &self.data_file_name)
    }
}

/// Identity of a data file: the cycle it was published in and its name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceFile {
    pub cycle_start_year: i32,
    pub data_file_name: String,
}

impl SourceFile {
    #[must_use]
    pub fn new(cycle_start_year: i32, data_file_name: impl Into<String>) -> Self {
        Self {
            cycle_start_year,
            data_file_name: data_file_name.into(),
        }
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cycle_start_year, self.data_file_name)
    }
}

/// Descriptive metadata shared by every variable of one data file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFileMeta {
    pub file: SourceFile,
    pub cycle_label: String,
    pub cycle_end_year: i32,
    pub data_file_desc: String,
    pub xpt_url: String,
}

/// A candidate variable as published in one data file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawVariable {
    pub variable_name: String,
    pub variable_desc: String,
    pub source_file: SourceFile,
    pub is_blood_candidate: bool,
}

/// The full manifest, validated to contain at least one blood candidate
#[derive(Debug, Clone)]
pub struct VariableManifest {
    rows: Vec<ManifestRow>,
}

impl VariableManifest {
    /// Wrap manifest rows; fails when no row is a blood candidate
    pub fn new(rows: Vec<ManifestRow>) -> Result<Self> {
        if rows.is_empty() {
            return Err(BiomarkerError::EmptyInput("variable manifest has no rows".into()));
        }
        if !rows.iter().any(|r| r.is_blood_candidate) {
            return Err(BiomarkerError::EmptyInput(
                "variable manifest has no blood candidate variables".into(),
            ));
        }
        Ok(Self { rows })
    }

    /// All rows, in manifest order
    #[must_use]
    pub fn rows(&self) -> &[ManifestRow] {
        &self.rows
    }

    /// Blood candidate rows, in manifest order (duplicates retained)
    pub fn blood_candidates(&self) -> impl Iterator<Item = &ManifestRow> {
        self.rows.iter().filter(|r| r.is_blood_candidate)
    }

    /// Blood candidate variables grouped by data file
    ///
    /// Repeated `(file, variable)` pairs collapse to their first occurrence.
    /// Files are ordered by cycle then name; variables keep manifest order.
    #[must_use]
    pub fn files(&self) -> Vec<(SourceFileMeta, Vec<RawVariable>)> {
        let mut grouped: BTreeMap<SourceFile, (SourceFileMeta, Vec<RawVariable>)> =
            BTreeMap::new();
        let mut seen: FxHashSet<(SourceFile, &str)> = FxHashSet::default();

        for row in self.blood_candidates() {
            let file = row.source_file();
            if !seen.insert((file.clone(), row.variable_name.as_str())) {
                continue;
            }
            let entry = grouped.entry(file.clone()).or_insert_with(|| {
                (
                    SourceFileMeta {
                        file: file.clone(),
                        cycle_label: row.cycle_label.clone(),
                        cycle_end_year: row.cycle_end_year,
                        data_file_desc: row.data_file_desc.clone(),
                        xpt_url: row.xpt_url.clone(),
                    },
                    Vec::new(),
                )
            });
            entry.1.push(RawVariable {
                variable_name: row.variable_name.clone(),
                variable_desc: row.variable_desc.clone(),
                source_file: file,
                is_blood_candidate: true,
            });
        }

        grouped.into_values().collect()
    }
}
