//! Long-table materialization
//!
//! Walks every data file named by the manifest, screens its candidate
//! variables, joins the surviving columns to the healthy adult cohort and
//! emits one harmonized row per (subject, variable) with the value already
//! converted to the pooled unit.

use indicatif::ParallelProgressIterator;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::algorithm::screening::VariableScreener;
use crate::models::cohort::CohortTable;
use crate::models::manifest::{RawVariable, SourceFileMeta, VariableManifest};
use crate::models::observation::HarmonizedObservation;
use crate::models::pooling::PoolingEntry;
use crate::models::screening::{ScreenReason, ScreenRecord};
use crate::sources::{ColumnSource, FileColumns};
use crate::utils::logging::{create_main_progress_bar, finish_progress_bar};

/// Everything produced by one materialization pass
#[derive(Debug, Clone, Default)]
pub struct LongTable {
    pub observations: Vec<HarmonizedObservation>,
    pub screening: Vec<ScreenRecord>,
    /// Files whose variables were screened
    pub files_processed: usize,
    /// Files that were absent, unreadable or had no cohort members
    pub files_skipped: usize,
}

/// Outcome for one data file
enum FileOutcome {
    Processed {
        observations: Vec<HarmonizedObservation>,
        screening: Vec<ScreenRecord>,
    },
    Skipped,
}

/// Applies screening and the pooling map to raw data files
pub struct LongTableMaterializer<'a> {
    screener: VariableScreener<'a>,
    cohort: &'a CohortTable,
    show_progress: bool,
}

impl<'a> LongTableMaterializer<'a> {
    #[must_use]
    pub fn new(screener: VariableScreener<'a>, cohort: &'a CohortTable) -> Self {
        Self {
            screener,
            cohort,
            show_progress: false,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Materialize every blood-candidate file of the manifest
    ///
    /// Files are processed in parallel; output keeps file order (cycle, then
    /// file name) and, within a file, manifest variable order.
    pub fn materialize(&self, manifest: &VariableManifest, source: &dyn ColumnSource) -> LongTable {
        let files = manifest.files();
        let pb = create_main_progress_bar(
            files.len() as u64,
            Some("Materializing"),
            self.show_progress,
        );

        let outcomes: Vec<FileOutcome> = files
            .par_iter()
            .progress_with(pb.clone())
            .map(|(meta, variables)| self.materialize_file(meta, variables, source))
            .collect();
        finish_progress_bar(&pb, Some("Materialized"));

        let mut table = LongTable::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Processed {
                    observations,
                    screening,
                } => {
                    table.files_processed += 1;
                    table.observations.extend(observations);
                    table.screening.extend(screening);
                }
                FileOutcome::Skipped => table.files_skipped += 1,
            }
        }

        info!(
            "Materialized {} observations from {} files ({} skipped)",
            table.observations.len(),
            table.files_processed,
            table.files_skipped
        );
        table
    }

    fn materialize_file(
        &self,
        meta: &SourceFileMeta,
        variables: &[RawVariable],
        source: &dyn ColumnSource,
    ) -> FileOutcome {
        let file = &meta.file;
        if !self.cohort.has_cycle(file.cycle_start_year) {
            debug!("No cohort members for cycle of {file}; skipping");
            return FileOutcome::Skipped;
        }

        let names: Vec<&str> = variables.iter().map(|v| v.variable_name.as_str()).collect();
        let columns = match source.load_file(file, &names) {
            Ok(Some(columns)) => columns,
            Ok(None) => {
                debug!("Data file {file} unavailable from {} source", source.source_name());
                return FileOutcome::Skipped;
            }
            Err(e) => {
                warn!("Skipping data file {file}: {e}");
                return FileOutcome::Skipped;
            }
        };

        let mut observations = Vec::new();
        let mut screening = Vec::with_capacity(variables.len());
        for variable in variables {
            let outcome = self
                .screener
                .screen(
                    &variable.variable_name,
                    &variable.variable_desc,
                    columns.column(&variable.variable_name),
                )
                .and_then(|entry| {
                    let rows = self.join_healthy(meta, variable, entry, &columns);
                    self.screener.check_healthy_rows(rows.len())?;
                    Ok((entry, rows))
                });

            match outcome {
                Ok((entry, rows)) => {
                    screening.push(screen_record(meta, variable, Ok(entry)));
                    observations.extend(rows);
                }
                Err(reason) => screening.push(screen_record(meta, variable, Err(reason))),
            }
        }

        FileOutcome::Processed {
            observations,
            screening,
        }
    }

    /// Rows of a kept variable belonging to healthy cohort members
    fn join_healthy(
        &self,
        meta: &SourceFileMeta,
        variable: &RawVariable,
        entry: &PoolingEntry,
        columns: &FileColumns,
    ) -> Vec<HarmonizedObservation> {
        let Some(values) = columns.column(&variable.variable_name) else {
            return Vec::new();
        };
        let factor = entry.conversion_factor_to_pooled_unit;
        let cycle = meta.file.cycle_start_year;

        columns
            .subject_ids()
            .iter()
            .zip(values)
            .filter_map(|(&id, &value)| {
                let (id, value) = (id?, value?);
                if !value.is_finite() {
                    return None;
                }
                let member = self.cohort.member(cycle, id).filter(|m| m.healthy_flag)?;
                Some(HarmonizedObservation {
                    subject_id: id,
                    age_years: member.age_years,
                    sex: member.sex,
                    cycle_label: meta.cycle_label.clone(),
                    cycle_start_year: cycle,
                    cycle_end_year: meta.cycle_end_year,
                    biomarker_id: entry.pooled_id.clone(),
                    variable_name: variable.variable_name.clone(),
                    biomarker_name: entry.pooled_name.clone(),
                    source_file: meta.file.data_file_name.clone(),
                    value: value * factor,
                    unit: entry.pooled_unit.clone(),
                    healthy_flag: member.healthy_flag,
                    exclusion_reason: member.exclusion_reason.clone(),
                })
            })
            .collect()
    }
}

fn screen_record(
    meta: &SourceFileMeta,
    variable: &RawVariable,
    outcome: Result<&PoolingEntry, ScreenReason>,
) -> ScreenRecord {
    let (kept, reason, pooled_id) = match outcome {
        Ok(entry) => (true, String::new(), Some(entry.pooled_id.clone())),
        Err(reason) => (false, reason.as_str().to_string(), None),
    };
    ScreenRecord {
        cycle_start_year: meta.file.cycle_start_year,
        data_file_name: meta.file.data_file_name.clone(),
        variable_name: variable.variable_name.clone(),
        variable_desc: variable.variable_desc.clone(),
        kept,
        reason,
        pooled_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::pooling::build_pooling_map;
    use crate::config::ScreeningConfig;
    use crate::models::cohort::CohortMember;
    use crate::models::manifest::{ManifestRow, SourceFile};
    use crate::models::observation::Sex;
    use crate::sources::MemoryColumnSource;

    fn row(file: &str, name: &str, desc: &str) -> ManifestRow {
        ManifestRow {
            cycle_label: "2017-2018".into(),
            cycle_start_year: 2017,
            cycle_end_year: 2018,
            data_file_name: file.into(),
            data_file_desc: "Standard Biochemistry Profile".into(),
            xpt_url: String::new(),
            variable_name: name.into(),
            variable_desc: desc.into(),
            use_constraints: String::new(),
            is_blood_candidate: true,
        }
    }

    fn member(id: i64, healthy: bool) -> CohortMember {
        CohortMember {
            subject_id: id,
            age_years: 30.0 + id as f64,
            sex: if id % 2 == 0 { Sex::Female } else { Sex::Male },
            cycle_start_year: 2017,
            healthy_flag: healthy,
            exclusion_reason: if healthy { String::new() } else { "diabetes".into() },
        }
    }

    #[test]
    fn converts_joins_and_screens() {
        let manifest = VariableManifest::new(vec![
            row("BIOPRO_J", "LBXSAL", "Albumin (g/dL)"),
            row("BIOPRO_J", "LBDSALSI", "Albumin (g/L)"),
            row("BIOPRO_J", "LBXNOPE", "Phantom (mg/dL)"),
        ])
        .unwrap();
        let pooling = build_pooling_map(manifest.rows());
        let screening = ScreeningConfig {
            min_non_missing: 3,
            min_distinct: 3,
            ..ScreeningConfig::default()
        };
        let cohort = CohortTable::new((1..=40).map(|id| member(id, id != 2))).unwrap();

        let ids: Vec<Option<i64>> = (1..=40).map(Some).collect();
        let g_dl: Vec<Option<f64>> = (1..=40).map(|i| Some(3.0 + f64::from(i) * 0.037)).collect();
        let g_l: Vec<Option<f64>> = g_dl.iter().map(|v| v.map(|x| x * 10.0)).collect();
        let source = MemoryColumnSource::new().with_file(
            SourceFile::new(2017, "BIOPRO_J"),
            FileColumns::new(ids)
                .with_column("LBXSAL", g_dl)
                .unwrap()
                .with_column("LBDSALSI", g_l)
                .unwrap(),
        );

        let screener = VariableScreener::from_config(&screening, &pooling);
        let table = LongTableMaterializer::new(screener, &cohort).materialize(&manifest, &source);

        assert_eq!(table.files_processed, 1);
        assert_eq!(table.screening.len(), 3);
        assert_eq!(table.screening[2].reason, "missing_in_file");
        // 40 subjects, one unhealthy, two variables
        assert_eq!(table.observations.len(), 78);
        assert!(table.observations.iter().all(|o| o.subject_id != 2));

        let first_sal = table.observations.iter().find(|o| o.variable_name == "LBXSAL").unwrap();
        let first_si = table.observations.iter().find(|o| o.variable_name == "LBDSALSI").unwrap();
        assert_eq!(first_sal.biomarker_id, first_si.biomarker_id);
        assert_eq!(first_sal.unit, first_si.unit);
        assert!((first_sal.value - first_si.value).abs() < 1e-9);
    }

    #[test]
    fn files_without_cohort_cycle_are_skipped() {
        let manifest =
            VariableManifest::new(vec![row("BIOPRO_J", "LBXSAL", "Albumin (g/dL)")]).unwrap();
        let pooling = build_pooling_map(manifest.rows());
        let mut other_cycle = member(1, true);
        other_cycle.cycle_start_year = 2015;
        let cohort = CohortTable::new([other_cycle]).unwrap();
        let screener = VariableScreener::from_config(&ScreeningConfig::default(), &pooling);

        let table = LongTableMaterializer::new(screener, &cohort)
            .materialize(&manifest, &MemoryColumnSource::new());
        assert_eq!(table.files_skipped, 1);
        assert!(table.screening.is_empty());
    }
}
