//! Biomarker catalog
//!
//! One entry per pooled biomarker that kept at least one variable, listing
//! the data files and source variables it was assembled from.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use rustc_hash::FxHashSet;

use crate::models::catalog::CatalogEntry;
use crate::models::manifest::VariableManifest;
use crate::models::pooling::PoolingMap;
use crate::models::screening::ScreenRecord;

/// Build the catalog of kept biomarkers
///
/// A variable kept in any file counts as kept everywhere: every blood
/// candidate manifest row naming it contributes its data file, including
/// files that were never read. Entries are sorted by biomarker name, then id.
#[must_use]
pub fn build_catalog(
    manifest: &VariableManifest,
    records: &[ScreenRecord],
    pooling: &PoolingMap,
) -> Vec<CatalogEntry> {
    let kept = records.iter().filter(|r| r.kept);
    let kept_variables: FxHashSet<&str> =
        kept.clone().map(|r| r.variable_name.as_str()).collect();
    let kept_ids: FxHashSet<&str> = kept.filter_map(|r| r.pooled_id.as_deref()).collect();

    let mut sources: BTreeMap<&str, (BTreeSet<&str>, BTreeSet<&str>)> = BTreeMap::new();
    for row in manifest.blood_candidates() {
        if !kept_variables.contains(row.variable_name.as_str()) {
            continue;
        }
        let Some(entry) = pooling.get(&row.variable_name) else {
            continue;
        };
        if !kept_ids.contains(entry.pooled_id.as_str()) {
            continue;
        }
        let (files, variables) = sources.entry(entry.pooled_id.as_str()).or_default();
        files.insert(row.data_file_name.as_str());
        variables.insert(row.variable_name.as_str());
    }

    sources
        .into_iter()
        .map(|(pooled_id, (files, variables))| {
            let reference = pooling.members(pooled_id).next();
            CatalogEntry {
                biomarker_id: pooled_id.to_string(),
                biomarker_name: reference
                    .map_or_else(|| pooled_id.to_string(), |e| e.pooled_name.clone()),
                unit: reference.map(|e| e.pooled_unit.clone()).unwrap_or_default(),
                source_file_count: files.len(),
                source_files: files.iter().join("|"),
                source_variable_count: variables.len(),
                source_variables: variables.iter().join("|"),
            }
        })
        .sorted_by(|a, b| {
            a.biomarker_name
                .cmp(&b.biomarker_name)
                .then_with(|| a.biomarker_id.cmp(&b.biomarker_id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::manifest::ManifestRow;
    use crate::models::pooling::{ConversionStatus, PoolingEntry};

    fn entry(name: &str, pooled_id: &str, pooled_name: &str) -> PoolingEntry {
        PoolingEntry {
            variable_name: name.into(),
            variable_desc: String::new(),
            base_key: pooled_id.into(),
            compat_key: "g/vol".into(),
            pooled_id: pooled_id.into(),
            pooled_name: pooled_name.into(),
            pooled_unit: "g/dL".into(),
            conversion_factor_to_pooled_unit: 1.0,
            conversion_status: ConversionStatus::Identity,
        }
    }

    fn row(cycle: i32, file: &str, name: &str) -> ManifestRow {
        ManifestRow {
            cycle_label: format!("{cycle}-{}", cycle + 1),
            cycle_start_year: cycle,
            cycle_end_year: cycle + 1,
            data_file_name: file.into(),
            data_file_desc: String::new(),
            xpt_url: String::new(),
            variable_name: name.into(),
            variable_desc: String::new(),
            use_constraints: String::new(),
            is_blood_candidate: true,
        }
    }

    fn record(file: &str, name: &str, pooled_id: Option<&str>) -> ScreenRecord {
        ScreenRecord {
            cycle_start_year: 2017,
            data_file_name: file.into(),
            variable_name: name.into(),
            variable_desc: String::new(),
            kept: pooled_id.is_some(),
            reason: if pooled_id.is_some() { String::new() } else { "no_healthy_data".into() },
            pooled_id: pooled_id.map(str::to_string),
        }
    }

    fn pooling() -> PoolingMap {
        PoolingMap::new(vec![
            entry("LBXSAL", "albumin", "Albumin (g/dL)"),
            entry("LBXSGL", "glucose", "Glucose (g/dL)"),
            entry("LBXTP", "total protein", "Total protein (g/dL)"),
        ])
    }

    #[test]
    fn collects_sorted_unique_sources() {
        let manifest = VariableManifest::new(vec![
            row(2017, "BIOPRO_J", "LBXSAL"),
            row(2015, "BIOPRO_I", "LBXSAL"),
            row(2015, "BIOPRO_I", "LBXSGL"),
            row(2017, "BIOPRO_J", "LBXTP"),
        ])
        .unwrap();
        let records = vec![
            record("BIOPRO_J", "LBXSAL", Some("albumin")),
            record("BIOPRO_I", "LBXSAL", Some("albumin")),
            record("BIOPRO_I", "LBXSGL", Some("glucose")),
            record("BIOPRO_J", "LBXTP", None),
        ];

        let catalog = build_catalog(&manifest, &records, &pooling());
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].biomarker_name, "Albumin (g/dL)");
        assert_eq!(catalog[0].source_files, "BIOPRO_I|BIOPRO_J");
        assert_eq!(catalog[0].source_file_count, 2);
        assert_eq!(catalog[0].source_variables, "LBXSAL");
        assert_eq!(catalog[1].biomarker_id, "glucose");
    }

    #[test]
    fn lists_every_manifest_file_of_a_kept_variable() {
        let mut urine = row(2011, "ALB_CR_G", "LBXSAL");
        urine.is_blood_candidate = false;
        let manifest = VariableManifest::new(vec![
            row(2013, "BIOPRO_H", "LBXSAL"),
            row(2017, "BIOPRO_J", "LBXSAL"),
            row(2017, "BIOPRO_J", "LBXTP"),
            urine,
        ])
        .unwrap();
        // BIOPRO_H was never read, LBXTP was excluded
        let records = vec![
            record("BIOPRO_J", "LBXSAL", Some("albumin")),
            record("BIOPRO_J", "LBXTP", None),
        ];

        let catalog = build_catalog(&manifest, &records, &pooling());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].source_files, "BIOPRO_H|BIOPRO_J");
        assert_eq!(catalog[0].source_file_count, 2);
    }
}
