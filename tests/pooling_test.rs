//! Tests for the pooling map builder

mod utils;

use std::collections::{HashMap, HashSet};

use biomarker_cv::algorithm::pooling::build_pooling_map;
use biomarker_cv::models::{ConversionStatus, ManifestRow};
use utils::manifest_row;

fn lab_manifest() -> Vec<ManifestRow> {
    vec![
        manifest_row(2015, "BIOPRO_I", "LBXSAL", "Albumin (g/dL)"),
        manifest_row(2017, "BIOPRO_J", "LBXSAL", "Albumin (g/dL)"),
        manifest_row(2017, "BIOPRO_J", "LBDSALSI", "Albumin (g/L)"),
        manifest_row(2017, "BIOPRO_J", "LBXSGL", "Glucose, serum (mg/dL)"),
        manifest_row(2017, "BIOPRO_J", "LBDSGLSI", "Glucose, serum (mmol/L)"),
        manifest_row(2017, "CBC_J", "LBXHCT", "Hematocrit (%)"),
        manifest_row(2017, "CBC_J", "LBXMCVSI", "Mean cell volume (fL)"),
        manifest_row(2017, "BIOPRO_J", "LBXSTP", "Total protein"),
    ]
}

#[test]
fn test_one_compat_key_per_pooled_id() {
    let map = build_pooling_map(&lab_manifest());

    let mut keys: HashMap<&str, HashSet<&str>> = HashMap::new();
    for entry in map.entries() {
        keys.entry(entry.pooled_id.as_str())
            .or_default()
            .insert(entry.compat_key.as_str());
    }
    assert!(keys.values().all(|k| k.len() == 1));

    let mut ids: HashMap<(&str, &str), HashSet<&str>> = HashMap::new();
    for entry in map.entries() {
        ids.entry((entry.base_key.as_str(), entry.compat_key.as_str()))
            .or_default()
            .insert(entry.pooled_id.as_str());
    }
    assert!(ids.values().all(|p| p.len() == 1));
}

#[test]
fn test_compatible_units_share_a_biomarker() {
    let map = build_pooling_map(&lab_manifest());
    let sal = map.get("LBXSAL").unwrap();
    let si = map.get("LBDSALSI").unwrap();

    assert_eq!(sal.pooled_id, "albumin");
    assert_eq!(sal.pooled_id, si.pooled_id);
    assert_eq!(sal.pooled_unit, si.pooled_unit);
    // LBXSAL is labelled twice, so its unit is the reference
    assert_eq!(sal.pooled_unit, "g/dL");
    assert_eq!(sal.conversion_status, ConversionStatus::Identity);
    assert_eq!(si.conversion_status, ConversionStatus::Converted);
    assert!((si.conversion_factor_to_pooled_unit - 0.1).abs() < 1e-12);
}

#[test]
fn test_incompatible_units_are_disambiguated() {
    let map = build_pooling_map(&lab_manifest());
    let mass = map.get("LBXSGL").unwrap();
    let molar = map.get("LBDSGLSI").unwrap();

    assert_eq!(mass.base_key, "glucose serum");
    assert_ne!(mass.pooled_id, molar.pooled_id);
    assert_eq!(mass.pooled_id, "glucose serum__mg/dl");
    assert_eq!(molar.pooled_id, "glucose serum__mmol/l");
    assert_eq!(molar.compat_key, "mol/vol");
    assert_eq!(mass.conversion_factor_to_pooled_unit, 1.0);
}

#[test]
fn test_units_outside_grammar_pool_by_raw_text() {
    let map = build_pooling_map(&lab_manifest());

    let hct = map.get("LBXHCT").unwrap();
    assert_eq!(hct.compat_key, "raw:%");
    assert_eq!(hct.pooled_id, "hematocrit");
    assert_eq!(hct.pooled_name, "Hematocrit (%)");

    let protein = map.get("LBXSTP").unwrap();
    assert_eq!(protein.compat_key, "raw:");
    assert_eq!(protein.pooled_unit, "");
    assert_eq!(protein.pooled_name, "Total protein");
}

#[test]
fn test_equivalent_raw_units_are_identity() {
    let rows = vec![
        manifest_row(2015, "FERTIN_I", "LBXFER", "Ferritin (ng/mL)"),
        manifest_row(2017, "FERTIN_J", "LBXFER", "Ferritin (ng/mL)"),
        manifest_row(2017, "FERTIN_J", "LBDFERSI", "Ferritin (ng/mL)"),
        manifest_row(2017, "CBC_J", "LBXPLT", "Platelet count (1000 cells/uL)"),
        manifest_row(2015, "CBC_I", "LBXPLTSI", "Platelet count (1000 cells/µL)"),
        manifest_row(2013, "CBC_H", "LBXPLTX", "Platelet count (1000 cells/uL)"),
    ];
    let map = build_pooling_map(&rows);

    // Same raw unit after normalization: identity
    let plt = map.get("LBXPLTSI").unwrap();
    assert_eq!(plt.conversion_status, ConversionStatus::Identity);
    assert_eq!(map.unreconciled_count(), 0);
    assert_eq!(map.members("ferritin").count(), 2);
}

#[test]
fn test_unitless_class_gets_compat_suffix() {
    let rows = vec![
        manifest_row(2015, "BIOPRO_I", "LBXSTP", "Total protein"),
        manifest_row(2017, "BIOPRO_J", "LBXSTPX", "Total protein (g/dL)"),
    ];
    let map = build_pooling_map(&rows);
    assert_eq!(map.get("LBXSTP").unwrap().pooled_id, "total protein__raw_");
    assert_eq!(map.get("LBXSTPX").unwrap().pooled_id, "total protein__g/dl");
}

#[test]
fn test_non_candidates_and_representative_labels() {
    let mut rows = lab_manifest();
    let mut urine = manifest_row(2017, "ALB_CR_J", "URXUMA", "Albumin, urine (ug/mL)");
    urine.is_blood_candidate = false;
    rows.push(urine);
    // A rarer relabelling does not replace the majority description
    rows.push(manifest_row(2019, "BIOPRO_K", "LBXSAL", "Albumin, serum (mg/dL)"));

    let map = build_pooling_map(&rows);
    assert!(!map.contains("URXUMA"));
    assert_eq!(map.get("LBXSAL").unwrap().variable_desc, "Albumin (g/dL)");
}

#[test]
fn test_pooling_is_deterministic() {
    let a = build_pooling_map(&lab_manifest());
    let mut reversed = lab_manifest();
    reversed.reverse();
    let b = build_pooling_map(&reversed);
    let a_ids: Vec<_> = a.entries().iter().map(|e| (&e.variable_name, &e.pooled_id)).collect();
    let b_ids: Vec<_> = b.entries().iter().map(|e| (&e.variable_name, &e.pooled_id)).collect();
    assert_eq!(a_ids, b_ids);
}
