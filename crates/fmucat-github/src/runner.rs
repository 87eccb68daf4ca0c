//! Stage runners: load the table, drive the batch, summarize

use anyhow::{Context, Result};
use fmucat_core::ProgressContext;
use fmucat_store::{BatchRunner, KeyedResultStore, StageReport};

use crate::client::GitHubClient;
use crate::config::{DownloadConfig, LicenseConfig, SearchConfig};
use crate::download::Downloader;
use crate::license::LicenseFetcher;
use crate::records::{DownloadRecord, LicenseRecord, LinkRecord};
use crate::repos::{RepoLayout, distinct_repositories};
use crate::search::{CodeSearch, LinkRecorder};
use crate::urls::read_url_list;

/// Record every code-search hit for `config.query` in the link catalog.
pub fn run_search(
    config: &SearchConfig,
    client: &GitHubClient,
    progress: &ProgressContext,
) -> Result<StageReport> {
    let mut store = KeyedResultStore::<LinkRecord>::load(&config.links_path)
        .context("Failed to load link catalog")?;
    log::info!(
        "Searching for \"{}\" (up to {} pages, {} links known)",
        config.query,
        config.max_pages,
        store.len()
    );

    let mut search = CodeSearch::new(client, config.query.as_str())
        .with_max_pages(config.max_pages)
        .with_page_delay(config.page_delay);
    let report = BatchRunner::new("search", config.options.clone())
        .with_progress(progress.stage_line("search"))
        .run(&mut search, &mut LinkRecorder, &mut store)
        .context("Failed to update link catalog")?;

    let stats = search.stats();
    log::info!(
        "Search: {} pages, {} links ({} new, {} already known), {} short, {} empty",
        stats.pages,
        stats.links,
        report.stats.succeeded,
        report.stats.skipped,
        stats.short_pages,
        stats.empty_pages
    );
    if let Some(error) = &stats.error {
        log::warn!("Search stopped early: {error}");
    }

    Ok(StageReport {
        report,
        summary: store.summary(),
    })
}

/// Download every listed file that is neither recorded nor on disk.
pub fn run_download(
    config: &DownloadConfig,
    client: &GitHubClient,
    progress: &ProgressContext,
) -> Result<StageReport> {
    let mut store = KeyedResultStore::<DownloadRecord>::load(&config.table_path)
        .context("Failed to load download table")?;
    let urls = read_url_list(&config.url_list)?;
    log::info!(
        "Downloading from {} into {}",
        config.url_list.display(),
        config.download_dir.display()
    );

    let report = BatchRunner::new("download", config.options.clone())
        .with_progress(progress.stage_line("download"))
        .run(urls, &mut Downloader::new(client, &config.download_dir), &mut store)
        .context("Failed to update download table")?;

    Ok(StageReport {
        report,
        summary: store.summary(),
    })
}

/// Look up the license of each distinct repository behind `model_paths`.
pub fn run_licenses<I>(
    config: &LicenseConfig,
    client: &GitHubClient,
    model_paths: I,
    progress: &ProgressContext,
) -> Result<StageReport>
where
    I: IntoIterator<Item = String>,
{
    let mut store = KeyedResultStore::<LicenseRecord>::load(&config.table_path)
        .context("Failed to load license table")?;
    let layout = RepoLayout::new(&config.download_dir);
    let repositories = distinct_repositories(&layout, model_paths);

    let mut fetcher = LicenseFetcher::new(client).with_min_delay(config.min_delay);
    let report = BatchRunner::new("licenses", config.options.clone())
        .with_progress(progress.stage_line("licenses"))
        .run(repositories, &mut fetcher, &mut store)
        .context("Failed to update license table")?;

    Ok(StageReport {
        report,
        summary: store.summary(),
    })
}
