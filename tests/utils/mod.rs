//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use biomarker_cv::models::{
    BinStatistic, CohortMember, ManifestRow, PoolingEntry, Sex, Stratum,
};
use parquet::arrow::ArrowWriter;

/// Subjects per cycle in the synthetic survey
pub const SUBJECTS: i64 = 700;

/// A blood-candidate manifest row
#[must_use]
pub fn manifest_row(cycle_start_year: i32, file: &str, name: &str, desc: &str) -> ManifestRow {
    ManifestRow {
        cycle_label: format!("{}-{}", cycle_start_year, cycle_start_year + 1),
        cycle_start_year,
        cycle_end_year: cycle_start_year + 1,
        data_file_name: file.to_string(),
        data_file_desc: "Standard Biochemistry Profile".to_string(),
        xpt_url: format!("https://example.org/{cycle_start_year}/{file}.XPT"),
        variable_name: name.to_string(),
        variable_desc: desc.to_string(),
        use_constraints: "None".to_string(),
        is_blood_candidate: true,
    }
}

/// Age of synthetic subject `i`: every age 20..=89 appears ten times
#[must_use]
pub fn subject_age(i: i64) -> f64 {
    20.0 + (i % 70) as f64
}

/// The last tenth of subjects is excluded from the healthy cohort
#[must_use]
pub fn is_healthy(i: i64) -> bool {
    i / 70 != 9
}

#[must_use]
pub fn subject_sex(i: i64) -> Sex {
    if i % 2 == 0 { Sex::Female } else { Sex::Male }
}

/// Albumin in g/dL whose spread shrinks with age
#[must_use]
pub fn albumin_g_dl(i: i64) -> f64 {
    let amplitude = 1.0 - (subject_age(i) - 20.0) * 0.01;
    let step = ((i / 70) % 4) as f64 - 1.5;
    4.0 + amplitude * step * 0.5
}

/// Cohort members for one cycle
#[must_use]
pub fn cohort_members(cycle_start_year: i32) -> Vec<CohortMember> {
    (0..SUBJECTS)
        .map(|i| CohortMember {
            subject_id: i,
            age_years: subject_age(i),
            sex: subject_sex(i),
            cycle_start_year,
            healthy_flag: is_healthy(i),
            exclusion_reason: if is_healthy(i) {
                String::new()
            } else {
                "diabetes".to_string()
            },
        })
        .collect()
}

/// A pooling entry with the given identity and factor
#[must_use]
pub fn pooling_entry(name: &str, pooled_id: &str, factor: f64) -> PoolingEntry {
    PoolingEntry {
        variable_name: name.to_string(),
        variable_desc: format!("{name} (mg/dL)"),
        base_key: pooled_id.to_string(),
        compat_key: "g/vol".to_string(),
        pooled_id: pooled_id.to_string(),
        pooled_name: format!("{pooled_id} (mg/dL)"),
        pooled_unit: "mg/dL".to_string(),
        conversion_factor_to_pooled_unit: factor,
        conversion_status: biomarker_cv::models::ConversionStatus::Identity,
    }
}

/// An eligible bin with a given CV
#[must_use]
pub fn bin(age_mid: f64, cv: f64, n: usize) -> BinStatistic {
    BinStatistic {
        biomarker_id: "albumin".to_string(),
        biomarker_name: "Albumin (g/dL)".to_string(),
        unit: "g/dL".to_string(),
        stratum: Stratum::All,
        age_bin: format!("{age_mid}"),
        age_mid,
        n,
        mean: 4.0,
        std: cv * 4.0,
        cv,
        p2_5: 3.0,
        p97_5: 5.0,
        ci95_low: 3.9,
        ci95_high: 4.1,
        passes_n_threshold: n >= 30,
    }
}

/// Write one record batch as a Parquet file, creating parent directories
pub fn write_batch(path: &Path, batch: &RecordBatch) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
}

/// Cohort table as produced upstream, with numeric sex codes
#[must_use]
pub fn cohort_batch(cycles: &[i32]) -> RecordBatch {
    let members: Vec<CohortMember> = cycles.iter().flat_map(|&c| cohort_members(c)).collect();
    let sex_codes: Vec<i64> = members
        .iter()
        .map(|m| if m.sex == Sex::Male { 1 } else { 2 })
        .collect();
    RecordBatch::try_from_iter(vec![
        (
            "seqn",
            Arc::new(Int64Array::from_iter_values(
                members.iter().map(|m| m.subject_id),
            )) as ArrayRef,
        ),
        (
            "age_years",
            Arc::new(Float64Array::from_iter_values(
                members.iter().map(|m| m.age_years),
            )) as ArrayRef,
        ),
        ("sex", Arc::new(Int64Array::from(sex_codes)) as ArrayRef),
        (
            "cycle_start_year",
            Arc::new(Int64Array::from_iter_values(
                members.iter().map(|m| i64::from(m.cycle_start_year)),
            )) as ArrayRef,
        ),
        (
            "healthy_flag",
            Arc::new(BooleanArray::from(
                members.iter().map(|m| m.healthy_flag).collect::<Vec<_>>(),
            )) as ArrayRef,
        ),
        (
            "exclusion_reason",
            Arc::new(StringArray::from(
                members
                    .iter()
                    .map(|m| m.exclusion_reason.as_str())
                    .collect::<Vec<_>>(),
            )) as ArrayRef,
        ),
    ])
    .unwrap()
}

/// Build a data file batch from a subject id column and named value columns
#[must_use]
pub fn data_batch(columns: Vec<(&str, Vec<Option<f64>>)>) -> RecordBatch {
    let mut arrays: Vec<(&str, ArrayRef)> = vec![(
        "SEQN",
        Arc::new(Float64Array::from_iter_values((0..SUBJECTS).map(|i| i as f64))) as ArrayRef,
    )];
    for (name, values) in columns {
        arrays.push((name, Arc::new(Float64Array::from(values)) as ArrayRef));
    }
    RecordBatch::try_from_iter(arrays).unwrap()
}

/// Values for every synthetic subject
#[must_use]
pub fn per_subject(f: impl Fn(i64) -> Option<f64>) -> Vec<Option<f64>> {
    (0..SUBJECTS).map(f).collect()
}
