//! Licenses subcommand - look up the license of every catalogued repository

use anyhow::{Context, Result};
use fmucat_core::ProgressContext;
use fmucat_fmi::ModelRecord;
use fmucat_github::{LicenseConfig, run_licenses};
use fmucat_store::{KeyedResultStore, Record};

use crate::config::Config;

pub fn run(config: &Config, test_mode: bool, progress: &ProgressContext) -> Result<()> {
    let client = super::github_client(config)?;

    let models_path = config.store.models_path();
    let models = KeyedResultStore::<ModelRecord>::load(&models_path)
        .context("Failed to load model catalog")?;
    anyhow::ensure!(
        !models.is_empty(),
        "Model catalog {} is empty; run `fmucat validate` first",
        models_path.display()
    );
    let model_paths: Vec<String> = models.records().map(|r| r.key().to_string()).collect();

    let mut licenses = LicenseConfig::new(
        config.store.download_dir(),
        config.store.licenses_path(),
        config.run.options(test_mode),
    );
    licenses.min_delay = config.github.license_delay();

    let stage = run_licenses(&licenses, &client, model_paths, progress)?;
    super::report("licenses", &stage, progress);
    Ok(())
}
