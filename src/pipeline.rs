//! End-to-end pipeline
//!
//! Loads the manifest and cohort, builds the pooling map, materializes the
//! harmonized long table, computes age-binned statistics and trends, and
//! writes every table to the output directory.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use itertools::Itertools;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::algorithm::catalog::build_catalog;
use crate::algorithm::materialize::{LongTable, LongTableMaterializer};
use crate::algorithm::pooling::build_pooling_map;
use crate::algorithm::screening::VariableScreener;
use crate::algorithm::statistics::{AgeBinnedAggregator, TrendDetector};
use crate::config::PipelineConfig;
use crate::error::util::{ensure_directory, validate_directory};
use crate::error::{BiomarkerError, Result};
use crate::models::catalog::CatalogEntry;
use crate::models::cohort::CohortTable;
use crate::models::manifest::VariableManifest;
use crate::models::pooling::PoolingMap;
use crate::models::screening::ScreeningSummary;
use crate::models::statistics::{BinStatistic, TrendMetric};
use crate::sources::{ColumnSource, ParquetColumnSource, read_cohort, read_manifest};
use crate::utils::io::parquet::write_records;
use crate::utils::logging::log_step_complete;

/// Output table names, written as `{name}.parquet`
pub const POOLING_MAP_TABLE: &str = "pooling_map";
pub const LONG_TABLE: &str = "biomarker_long";
pub const SCREENING_TABLE: &str = "variable_screening";
pub const CATALOG_TABLE: &str = "biomarker_catalog";
pub const BINS_ALL_TABLE: &str = "cv_by_age_all";
pub const BINS_TABLE: &str = "cv_by_age";
pub const TRENDS_TABLE: &str = "cv_trend_metrics";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Counts describing one run, written as `run_summary.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub manifest_rows: usize,
    pub blood_candidate_rows: usize,
    pub pooled_variables: usize,
    pub pooled_biomarkers: usize,
    pub unreconciled_conversions: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub observations: usize,
    pub biomarkers_kept: usize,
    pub screening: ScreeningSummary,
    pub bins: usize,
    pub bins_passing_n_threshold: usize,
    pub trend_metrics: usize,
    pub decline_flags: usize,
}

impl RunSummary {
    /// Log the headline counts of a finished run
    ///
    /// Unreconciled unit conversions are reported as a warning.
    pub fn report(&self, elapsed: Duration) {
        info!(
            "Done in {elapsed:?}: {} observations, {} biomarkers, {} bins, {} declining trends",
            self.observations, self.biomarkers_kept, self.bins, self.decline_flags
        );
        if self.unreconciled_conversions > 0 {
            warn!(
                "{} pooled variables kept a unit factor of 1.0 without reconciliation",
                self.unreconciled_conversions
            );
        }
    }
}

/// Every table produced by a run
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub pooling_map: PoolingMap,
    pub long_table: LongTable,
    pub catalog: Vec<CatalogEntry>,
    pub bins: Vec<BinStatistic>,
    pub trends: Vec<TrendMetric>,
    pub summary: RunSummary,
}

impl PipelineOutputs {
    /// Bins with enough observations to count toward trends
    pub fn passing_bins(&self) -> impl Iterator<Item = &BinStatistic> {
        self.bins.iter().filter(|b| b.passes_n_threshold)
    }
}

/// Runs the harmonization and statistics pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run against the configured Parquet inputs and write all outputs
    pub fn run(&self) -> Result<RunSummary> {
        self.config.validate()?;
        let paths = &self.config.paths;
        validate_directory(&paths.raw_dir, "raw data files")?;
        ensure_directory(&paths.out_dir, "pipeline outputs")?;

        let manifest = read_manifest(&paths.manifest, self.config.batch_size)?;
        let cohort = read_cohort(&paths.cohort, self.config.batch_size)?;
        let source = ParquetColumnSource::new(
            &paths.raw_dir,
            &self.config.screening.subject_id_column,
            self.config.batch_size,
        );

        let outputs = self.run_with(&manifest, &cohort, &source)?;
        self.write_outputs(&outputs, &paths.out_dir)?;
        Ok(outputs.summary)
    }

    /// Run on already-loaded inputs without touching the output directory
    pub fn run_with(
        &self,
        manifest: &VariableManifest,
        cohort: &CohortTable,
        source: &dyn ColumnSource,
    ) -> Result<PipelineOutputs> {
        let started_at = Utc::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.effective_threads())
            .build()
            .map_err(|e| BiomarkerError::Config(format!("cannot build worker pool: {e}")))?;

        pool.install(|| {
            let step = Instant::now();
            let pooling_map = build_pooling_map(manifest.rows());
            log_step_complete(
                "pooling",
                &format!(
                    "{} variables into {} biomarkers, {} unreconciled",
                    pooling_map.len(),
                    count_pooled(&pooling_map),
                    pooling_map.unreconciled_count()
                ),
                step.elapsed(),
            );

            let step = Instant::now();
            let screener = VariableScreener::from_config(&self.config.screening, &pooling_map);
            let long_table = LongTableMaterializer::new(screener, cohort)
                .with_progress(self.config.show_progress)
                .materialize(manifest, source);
            let catalog = build_catalog(manifest, &long_table.screening, &pooling_map);
            log_step_complete(
                "materialize",
                &format!(
                    "{} observations, {} biomarkers kept",
                    long_table.observations.len(),
                    catalog.len()
                ),
                step.elapsed(),
            );

            let step = Instant::now();
            let bins = AgeBinnedAggregator::from_config(&self.config.statistics)
                .aggregate_all(&long_table.observations);
            let trends = TrendDetector::from_config(&self.config.statistics).detect_all(&bins);
            log_step_complete(
                "statistics",
                &format!("{} bins, {} trend metrics", bins.len(), trends.len()),
                step.elapsed(),
            );

            let summary = RunSummary {
                started_at,
                finished_at: Utc::now(),
                manifest_rows: manifest.rows().len(),
                blood_candidate_rows: manifest.blood_candidates().count(),
                pooled_variables: pooling_map.len(),
                pooled_biomarkers: count_pooled(&pooling_map),
                unreconciled_conversions: pooling_map.unreconciled_count(),
                files_processed: long_table.files_processed,
                files_skipped: long_table.files_skipped,
                observations: long_table.observations.len(),
                biomarkers_kept: catalog.len(),
                screening: ScreeningSummary::from_records(&long_table.screening),
                bins: bins.len(),
                bins_passing_n_threshold: bins.iter().filter(|b| b.passes_n_threshold).count(),
                trend_metrics: trends.len(),
                decline_flags: trends.iter().filter(|t| t.decline_flag).count(),
            };

            Ok(PipelineOutputs {
                pooling_map,
                long_table,
                catalog,
                bins,
                trends,
                summary,
            })
        })
    }

    /// Write every output table and the run summary into `out_dir`
    pub fn write_outputs(&self, outputs: &PipelineOutputs, out_dir: &Path) -> Result<()> {
        ensure_directory(out_dir, "pipeline outputs")?;
        let table = |name: &str| out_dir.join(format!("{name}.parquet"));

        write_records(&table(POOLING_MAP_TABLE), outputs.pooling_map.entries())?;
        write_records(&table(LONG_TABLE), &outputs.long_table.observations)?;
        write_records(&table(SCREENING_TABLE), &outputs.long_table.screening)?;
        write_records(&table(CATALOG_TABLE), &outputs.catalog)?;
        write_records(&table(BINS_ALL_TABLE), &outputs.bins)?;
        let passing = outputs.passing_bins().cloned().collect_vec();
        write_records(&table(BINS_TABLE), &passing)?;
        write_records(&table(TRENDS_TABLE), &outputs.trends)?;

        let summary_path = out_dir.join(RUN_SUMMARY_FILE);
        let file = File::create(&summary_path).map_err(|e| {
            BiomarkerError::io_error_with_source("Failed to create run summary", e)
                .with_path(&summary_path)
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), &outputs.summary)?;
        info!("Wrote outputs to {}", out_dir.display());
        Ok(())
    }
}

fn count_pooled(pooling_map: &PoolingMap) -> usize {
    pooling_map
        .entries()
        .iter()
        .map(|e| e.pooled_id.as_str())
        .unique()
        .count()
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, Once};

    use log::{Level, Log, Metadata, Record};

    use super::*;

    struct CaptureLogger(Mutex<Vec<(Level, String)>>);

    impl Log for CaptureLogger {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.0.lock().unwrap().push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger(Mutex::new(Vec::new()));
    static INIT: Once = Once::new();

    fn captured(needle: &str) -> Vec<Level> {
        INIT.call_once(|| {
            log::set_logger(&LOGGER).unwrap();
            log::set_max_level(log::LevelFilter::Trace);
        });
        LOGGER
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, msg)| msg.contains(needle))
            .map(|(level, _)| *level)
            .collect()
    }

    fn summary(unreconciled: usize) -> RunSummary {
        RunSummary {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            manifest_rows: 10,
            blood_candidate_rows: 8,
            pooled_variables: 8,
            pooled_biomarkers: 5,
            unreconciled_conversions: unreconciled,
            files_processed: 2,
            files_skipped: 0,
            observations: 100,
            biomarkers_kept: 3,
            screening: ScreeningSummary::default(),
            bins: 14,
            bins_passing_n_threshold: 14,
            trend_metrics: 3,
            decline_flags: 1,
        }
    }

    #[test]
    fn unreconciled_conversions_are_reported_as_warning() {
        captured("");
        summary(3).report(Duration::from_secs(1));
        let levels = captured("3 pooled variables kept a unit factor");
        assert_eq!(levels, vec![Level::Warn]);
    }

    #[test]
    fn reconciled_run_reports_no_warning() {
        captured("");
        summary(0).report(Duration::from_secs(1));
        assert!(captured("0 pooled variables kept a unit factor").is_empty());
    }
}
