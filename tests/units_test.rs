//! Tests for unit parsing, conversion and label handling

use biomarker_cv::algorithm::labels::{normalize_base_name, split_label};
use biomarker_cv::algorithm::units::{
    NumBase, conversion_factor, convert_value, normalize_unit, parse_unit_signature,
};
use proptest::prelude::*;

const PREFIXES: &[&str] = &["", "p", "n", "u", "µ", "m", "c", "d"];
const BASES: &[&str] = &["g", "mol", "IU", "U", "Eq", "kat"];
const VOLUMES: &[&str] = &["L", "dL", "mL", "uL"];

fn unit_in(base: &'static str) -> impl Strategy<Value = String> {
    (prop::sample::select(PREFIXES), prop::sample::select(VOLUMES))
        .prop_map(move |(prefix, volume)| format!("{prefix}{base}/{volume}"))
}

fn compatible_pair() -> impl Strategy<Value = (String, String)> {
    prop::sample::select(BASES).prop_flat_map(|base| (unit_in(base), unit_in(base)))
}

proptest! {
    #[test]
    fn test_conversion_is_reciprocal((a, b) in compatible_pair()) {
        let forward = conversion_factor(&a, &b).unwrap();
        let backward = conversion_factor(&b, &a).unwrap();
        prop_assert!(forward > 0.0 && backward > 0.0);
        prop_assert!((forward * backward - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_restores_value((a, b) in compatible_pair(), value in -1e6f64..1e6) {
        let there = convert_value(value, &a, &b).unwrap();
        let back = convert_value(there, &b, &a).unwrap();
        prop_assert!((back - value).abs() <= 1e-9 * value.abs().max(1.0));
    }

    #[test]
    fn test_identity_factor_is_one(a in prop::sample::select(BASES).prop_flat_map(unit_in)) {
        let factor = conversion_factor(&a, &a).unwrap();
        prop_assert!((factor - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_known_conversions() {
    let close = |a: f64, b: f64| (a - b).abs() <= 1e-12 * b.abs().max(1.0);
    assert!(close(conversion_factor("mg/dL", "g/L").unwrap(), 0.01));
    assert!(close(conversion_factor("g/L", "mg/dL").unwrap(), 100.0));
    assert!(close(conversion_factor("umol/L", "mmol/L").unwrap(), 1e-3));
    assert!(close(conversion_factor("ng/mL", "ug/L").unwrap(), 1.0));
    assert!(close(conversion_factor("µg/dL", "ug/L").unwrap(), 10.0));
    assert!(close(convert_value(4.2, "g/dL", "g/L").unwrap(), 42.0));
}

#[test]
fn test_incompatible_or_unparseable_units() {
    assert_eq!(conversion_factor("mg/dL", "mmol/L"), None);
    assert_eq!(conversion_factor("%", "%"), None);
    assert_eq!(conversion_factor("", "mg/dL"), None);
    assert_eq!(conversion_factor("10^3 cells/uL", "10^3 cells/uL"), None);
    assert_eq!(convert_value(1.0, "mg/dL", "fL"), None);
}

#[test]
fn test_signature_grammar() {
    let sig = parse_unit_signature(" MMOL / l ").unwrap();
    assert_eq!(sig.num_base, NumBase::Mol);
    assert_eq!(sig.unit_norm, "mmol/l");
    assert_eq!(sig.compat_key(), "mol/vol");

    assert_eq!(parse_unit_signature("U/L").unwrap().num_base, NumBase::U);
    assert_eq!(parse_unit_signature("mIU/mL").unwrap().num_base, NumBase::Iu);
    assert!(parse_unit_signature("mg").is_none());
    assert!(parse_unit_signature("kg/L").is_none());
    assert!(parse_unit_signature("mg/dL/h").is_none());
    assert!(parse_unit_signature("fL").is_none());
    assert_eq!(normalize_unit(" μg / dL "), "ug/dl");
}

#[test]
fn test_label_parts_feed_pooling_keys() {
    let split = split_label("Gamma glutamyl transferase (GGT) (U/L)");
    assert_eq!(split.unit, "U/L");
    assert_eq!(normalize_base_name(&split.base), "gamma glutamyl transferase ggt");

    let split = split_label("Albumin, refrigerated serum (g/dL)");
    assert_eq!(normalize_base_name(&split.base), "albumin refrigerated serum");
}
