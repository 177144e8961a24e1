//! Pooling map records

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// How a variable's conversion factor was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    /// Unit normalizes identically to the pooled unit (or both are absent)
    Identity,
    /// Factor derived from the two unit signatures
    Converted,
    /// Same compatibility class but the calculator could not reconcile the
    /// units; the factor falls back to 1.0
    Unreconciled,
}

/// The pooled identity assigned to one source variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolingEntry {
    pub variable_name: String,
    pub variable_desc: String,
    pub base_key: String,
    pub compat_key: String,
    pub pooled_id: String,
    pub pooled_name: String,
    pub pooled_unit: String,
    pub conversion_factor_to_pooled_unit: f64,
    pub conversion_status: ConversionStatus,
}

/// Read-only lookup from variable name to pooling entry
#[derive(Debug, Clone, Default)]
pub struct PoolingMap {
    entries: Vec<PoolingEntry>,
    index: FxHashMap<String, usize>,
}

impl PoolingMap {
    #[must_use]
    pub fn new(entries: Vec<PoolingEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.variable_name.clone(), i))
            .collect();
        Self { entries, index }
    }

    /// Entry for a source variable, if it was pooled
    #[must_use]
    pub fn get(&self, variable_name: &str) -> Option<&PoolingEntry> {
        self.index.get(variable_name).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn contains(&self, variable_name: &str) -> bool {
        self.index.contains_key(variable_name)
    }

    #[must_use]
    pub fn entries(&self) -> &[PoolingEntry] {
        &self.entries
    }

    /// Entries sharing a pooled identity
    pub fn members<'a>(&'a self, pooled_id: &'a str) -> impl Iterator<Item = &'a PoolingEntry> {
        self.entries.iter().filter(move |e| e.pooled_id == pooled_id)
    }

    /// Number of entries whose conversion fell back to 1.0
    #[must_use]
    pub fn unreconciled_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.conversion_status == ConversionStatus::Unreconciled)
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
