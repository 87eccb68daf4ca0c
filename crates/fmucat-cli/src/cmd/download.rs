//! Download subcommand - fetch every listed file into the download tree

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fmucat_core::ProgressContext;
use fmucat_github::{DownloadConfig, run_download};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// URL list, one link per line (default: the link catalog)
    #[arg(short, long)]
    pub urls: Option<PathBuf>,
}

pub fn run(
    args: DownloadArgs,
    config: &Config,
    test_mode: bool,
    progress: &ProgressContext,
) -> Result<()> {
    let client = super::github_client(config)?;
    let download = DownloadConfig {
        url_list: args.urls.unwrap_or_else(|| config.store.links_path()),
        download_dir: config.store.download_dir(),
        table_path: config.store.downloads_path(),
        options: config
            .run
            .options(test_mode)
            .with_item_delay(config.github.download_delay()),
    };

    let stage = run_download(&download, &client, progress)?;
    super::report("download", &stage, progress);
    Ok(())
}
