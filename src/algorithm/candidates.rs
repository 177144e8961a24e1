//! Blood-candidate classification for manifests that lack the flag

use std::sync::LazyLock;

use regex::Regex;

const INCLUDE_TOKENS: &[&str] = &["blood", "serum", "plasma", "whole blood", "rbc", "wbc"];
const EXCLUDE_TOKENS: &[&str] = &[
    "urine", "urinary", "saliva", "oral", "vaginal", "semen", "hair", "nail", "milk", "csf",
];

// Lab analytes are often coded LBX*/LBD*/SS* without naming the matrix.
static LAB_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(lbx[a-z0-9]*|lbd[a-z0-9]*|sst[a-z0-9]*|ss[a-z0-9]+)\b")
        .expect("lab code pattern is valid")
});

/// Whether a manifest variable looks like a blood measurement
///
/// Restricted-access (`RDC`) variables are never candidates.
#[must_use]
pub fn is_blood_candidate(
    data_file_desc: &str,
    variable_desc: &str,
    use_constraints: &str,
    variable_name: &str,
) -> bool {
    let text = format!("{data_file_desc} {variable_desc} {variable_name}").to_lowercase();
    if use_constraints.to_lowercase().contains("rdc") {
        return false;
    }
    if EXCLUDE_TOKENS.iter().any(|t| text.contains(t)) {
        return false;
    }
    INCLUDE_TOKENS.iter().any(|t| text.contains(t)) || LAB_CODE.is_match(&text)
}
