//! In-memory column source

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::models::manifest::SourceFile;
use crate::sources::{ColumnSource, FileColumns};

/// Column source backed by tables held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryColumnSource {
    files: FxHashMap<SourceFile, FileColumns>,
}

impl MemoryColumnSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the contents of a data file, replacing any previous table
    pub fn insert(&mut self, file: SourceFile, columns: FileColumns) {
        self.files.insert(file, columns);
    }

    #[must_use]
    pub fn with_file(mut self, file: SourceFile, columns: FileColumns) -> Self {
        self.insert(file, columns);
        self
    }
}

impl ColumnSource for MemoryColumnSource {
    fn source_name(&self) -> &'static str {
        "memory"
    }

    fn load_file(&self, file: &SourceFile, variables: &[&str]) -> Result<Option<FileColumns>> {
        let Some(table) = self.files.get(file) else {
            return Ok(None);
        };
        let mut out = FileColumns::new(table.subject_ids().to_vec());
        for &name in variables {
            if let Some(values) = table.column(name) {
                out.insert(name, values.to_vec())?;
            }
        }
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_only_requested_columns() {
        let file = SourceFile::new(2017, "BIOPRO_J");
        let table = FileColumns::new(vec![Some(1)])
            .with_column("LBXSAL", vec![Some(4.2)])
            .unwrap()
            .with_column("LBXSGL", vec![Some(90.0)])
            .unwrap();
        let source = MemoryColumnSource::new().with_file(file.clone(), table);

        let loaded = source.load_file(&file, &["LBXSAL", "LBXNONE"]).unwrap().unwrap();
        assert!(loaded.has_column("LBXSAL"));
        assert!(!loaded.has_column("LBXSGL"));
        assert!(!loaded.has_column("LBXNONE"));

        let missing = SourceFile::new(2015, "BIOPRO_I");
        assert!(source.load_file(&missing, &["LBXSAL"]).unwrap().is_none());
    }
}
