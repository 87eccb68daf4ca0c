//! Subcommands

pub mod download;
pub mod licenses;
pub mod search;
pub mod show_config;
pub mod status;
pub mod validate;

use anyhow::Result;
use fmucat_core::ProgressContext;
use fmucat_github::{GitHubClient, resolve_token};
use fmucat_store::{StageReport, StopReason};

use crate::config::Config;

/// Authenticated client for the configured endpoints.
pub fn github_client(config: &Config) -> Result<GitHubClient> {
    let token = resolve_token(config.github.token.as_deref())?;
    Ok(GitHubClient::new(&token)
        .with_api_base(&config.github.api_base)
        .with_raw_base(&config.github.raw_base))
}

/// Render a stage summary: table on a TTY, log lines otherwise.
pub fn report(title: &str, stage: &StageReport, progress: &ProgressContext) {
    if progress.is_tty() {
        stage.summary.print(title);
    } else {
        stage.summary.log(title);
    }
    match stage.report.stop {
        StopReason::Exhausted => {}
        StopReason::CapReached => log::info!("{title}: stopped at the test-mode limit"),
        StopReason::Interrupted => log::warn!("{title}: interrupted, progress saved"),
    }
}
