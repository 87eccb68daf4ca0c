//! Validate subcommand - catalog every local model file

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fmucat_core::ProgressContext;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory to scan (default: the download directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}

pub fn run(
    args: ValidateArgs,
    config: &Config,
    test_mode: bool,
    progress: &ProgressContext,
) -> Result<()> {
    let validate = fmucat_fmi::Config {
        models_dir: args.dir.unwrap_or_else(|| config.store.download_dir()),
        table_path: config.store.models_path(),
        options: config.run.options(test_mode),
    };

    let stage = fmucat_fmi::run(&validate, progress)?;
    super::report("validate", &stage, progress);
    Ok(())
}
