use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use biomarker_cv::{Pipeline, PipelineConfig};
use log::info;

#[cfg(feature = "snmalloc")]
#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional single argument: path to a JSON config
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => PipelineConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    info!(
        "Running with manifest {}, cohort {}, raw data {}",
        config.paths.manifest.display(),
        config.paths.cohort.display(),
        config.paths.raw_dir.display()
    );

    let start = Instant::now();
    let out_dir = config.paths.out_dir.clone();
    let summary = Pipeline::new(config)
        .run()
        .context("Biomarker pipeline failed")?;

    summary.report(start.elapsed());
    info!("Outputs written to {}", out_dir.display());
    Ok(())
}
