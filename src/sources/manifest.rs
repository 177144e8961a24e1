//! Variable manifest reader

use std::path::Path;

use log::{debug, info};

use crate::algorithm::candidates::is_blood_candidate;
use crate::error::Result;
use crate::models::manifest::{ManifestRow, VariableManifest};
use crate::utils::arrow::{bool_column, i64_column, string_column};
use crate::utils::io::parquet::read_parquet;

const TABLE: &str = "variable manifest";

/// Read the variable manifest from Parquet
///
/// `variable_name`, `variable_desc`, `data_file_name` and `cycle_start_year`
/// are required. When `is_blood_candidate` is absent it is derived from the
/// file and variable descriptions. Rows lacking a variable name, file name or
/// cycle year are skipped.
pub fn read_manifest(path: &Path, batch_size: usize) -> Result<VariableManifest> {
    let batches = read_parquet(path, None, batch_size)?;
    let mut rows = Vec::new();
    let mut derived_flags = false;

    for batch in &batches {
        let names = string_column(batch, "variable_name", true, TABLE)?.unwrap_or_default();
        let descs = string_column(batch, "variable_desc", true, TABLE)?.unwrap_or_default();
        let files = string_column(batch, "data_file_name", true, TABLE)?.unwrap_or_default();
        let starts = i64_column(batch, "cycle_start_year", true, TABLE)?.unwrap_or_default();
        let ends = i64_column(batch, "cycle_end_year", false, TABLE)?;
        let labels = string_column(batch, "cycle_label", false, TABLE)?;
        let file_descs = string_column(batch, "data_file_desc", false, TABLE)?;
        let urls = string_column(batch, "xpt_url", false, TABLE)?;
        let constraints = string_column(batch, "use_constraints", false, TABLE)?;
        let flags = bool_column(batch, "is_blood_candidate", false, TABLE)?;
        derived_flags |= flags.is_none();

        let text = |col: &Option<Vec<Option<String>>>, i: usize| -> String {
            col.as_ref()
                .and_then(|c| c[i].clone())
                .unwrap_or_default()
        };

        for i in 0..batch.num_rows() {
            let (Some(variable_name), Some(data_file_name), Some(start)) =
                (names[i].clone(), files[i].clone(), starts[i])
            else {
                continue;
            };
            let cycle_start_year = start as i32;
            let cycle_end_year = ends
                .as_ref()
                .and_then(|c| c[i])
                .map_or(cycle_start_year + 1, |v| v as i32);
            let cycle_label = labels
                .as_ref()
                .and_then(|c| c[i].clone())
                .unwrap_or_else(|| format!("{cycle_start_year}-{cycle_end_year}"));
            let variable_desc = descs[i].clone().unwrap_or_default();
            let data_file_desc = text(&file_descs, i);
            let use_constraints = text(&constraints, i);

            let is_blood = match &flags {
                Some(col) => col[i].unwrap_or(false),
                None => is_blood_candidate(
                    &data_file_desc,
                    &variable_desc,
                    &use_constraints,
                    &variable_name,
                ),
            };

            rows.push(ManifestRow {
                cycle_label,
                cycle_start_year,
                cycle_end_year,
                data_file_name,
                data_file_desc,
                xpt_url: text(&urls, i),
                variable_name,
                variable_desc,
                use_constraints,
                is_blood_candidate: is_blood,
            });
        }
    }

    if derived_flags {
        debug!("Manifest has no is_blood_candidate column; derived from descriptions");
    }
    let manifest = VariableManifest::new(rows)?;
    info!(
        "Loaded {} manifest rows ({} blood candidates)",
        manifest.rows().len(),
        manifest.blood_candidates().count()
    );
    Ok(manifest)
}
