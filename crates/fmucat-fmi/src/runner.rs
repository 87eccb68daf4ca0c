//! Validation stage runner

use anyhow::{Context, Result};
use fmucat_core::ProgressContext;
use fmucat_store::{BatchRunner, KeyedResultStore, StageReport};

use crate::config::Config;
use crate::record::ModelRecord;
use crate::source::fmu_files;
use crate::validator::FileValidator;

/// Validate every model file under `config.models_dir` not yet in the catalog.
pub fn run(config: &Config, progress: &ProgressContext) -> Result<StageReport> {
    let mut store = KeyedResultStore::<ModelRecord>::load(&config.table_path)
        .context("Failed to load model catalog")?;
    log::info!(
        "Validating models under {} ({} already catalogued)",
        config.models_dir.display(),
        store.len()
    );

    let files = fmu_files(&config.models_dir)?;
    let report = BatchRunner::new("validate", config.options.clone())
        .with_progress(progress.stage_line("validate"))
        .run(files, &mut FileValidator::new(), &mut store)
        .context("Failed to update model catalog")?;

    let s = report.stats;
    log::info!("{} valid FMUs, {} invalid FMUs", s.succeeded, s.failed);

    Ok(StageReport {
        report,
        summary: store.summary(),
    })
}
