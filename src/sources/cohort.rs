//! Cohort table reader

use std::path::Path;

use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use log::info;

use crate::error::{BiomarkerError, Result};
use crate::models::cohort::{CohortMember, CohortTable};
use crate::models::observation::Sex;
use crate::utils::arrow::{bool_column, f64_column, i64_column, string_column};
use crate::utils::io::parquet::{read_parquet, read_parquet_schema};

const TABLE: &str = "cohort table";

/// Accepted names for the subject identifier, in lookup order
const SUBJECT_ID_COLUMNS: &[&str] = &["subject_id", "seqn", "SEQN"];

/// Columns besides the subject id that every cohort table must carry
const REQUIRED_COLUMNS: &[&str] = &["age_years", "sex", "cycle_start_year", "healthy_flag"];

fn subject_id_column(schema: &Schema) -> Result<&'static str> {
    SUBJECT_ID_COLUMNS
        .iter()
        .copied()
        .find(|name| schema.index_of(name).is_ok())
        .ok_or_else(|| BiomarkerError::column_not_found("subject_id", TABLE))
}

/// Sex as text (`Male`/`Female`) or numeric code (`1`/`2`)
fn sex_column(batch: &RecordBatch) -> Result<Vec<Sex>> {
    let schema = batch.schema();
    let field = schema
        .field_with_name("sex")
        .map_err(|_| BiomarkerError::column_not_found("sex", TABLE))?;
    let sexes = match field.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Dictionary(..) => {
            string_column(batch, "sex", true, TABLE)?
                .unwrap_or_default()
                .into_iter()
                .map(|s| s.as_deref().map_or(Sex::Unknown, Sex::parse))
                .collect()
        }
        _ => i64_column(batch, "sex", true, TABLE)?
            .unwrap_or_default()
            .into_iter()
            .map(|code| code.map_or(Sex::Unknown, |c| Sex::from(c as i32)))
            .collect(),
    };
    Ok(sexes)
}

/// Read the cohort eligibility table from Parquet
///
/// Required columns: a subject id (`subject_id` or `seqn`), `age_years`,
/// `sex`, `cycle_start_year` and `healthy_flag`. `exclusion_reason` is
/// optional. Rows lacking an id, age or cycle are skipped; a missing
/// `healthy_flag` value counts as not healthy. Members under 20 are dropped
/// and an empty result is an error.
pub fn read_cohort(path: &Path, batch_size: usize) -> Result<CohortTable> {
    let schema = read_parquet_schema(path)?;
    let id_column = subject_id_column(&schema)?;
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| schema.index_of(c).is_err()) {
        return Err(BiomarkerError::column_not_found(*missing, TABLE));
    }

    let batches = read_parquet(path, None, batch_size)?;
    let mut members = Vec::new();

    for batch in &batches {
        let ids = i64_column(batch, id_column, true, TABLE)?.unwrap_or_default();
        let ages = f64_column(batch, "age_years", true, TABLE)?.unwrap_or_default();
        let sexes = sex_column(batch)?;
        let cycles = i64_column(batch, "cycle_start_year", true, TABLE)?.unwrap_or_default();
        let healthy = bool_column(batch, "healthy_flag", true, TABLE)?.unwrap_or_default();
        let reasons = string_column(batch, "exclusion_reason", false, TABLE)?;

        for i in 0..batch.num_rows() {
            let (Some(subject_id), Some(age_years), Some(cycle)) = (ids[i], ages[i], cycles[i])
            else {
                continue;
            };
            members.push(CohortMember {
                subject_id,
                age_years,
                sex: sexes[i],
                cycle_start_year: cycle as i32,
                healthy_flag: healthy[i].unwrap_or(false),
                exclusion_reason: reasons
                    .as_ref()
                    .and_then(|c| c[i].clone())
                    .unwrap_or_default(),
            });
        }
    }

    let cohort = CohortTable::new(members)?;
    info!(
        "Loaded cohort of {} adults ({} healthy)",
        cohort.len(),
        cohort.healthy_count()
    );
    Ok(cohort)
}
