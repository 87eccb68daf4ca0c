//! Stage configurations for the GitHub-facing pipelines

use std::path::PathBuf;
use std::time::Duration;

use fmucat_store::RunOptions;

use crate::license::MIN_LOOKUP_DELAY;
use crate::search::{MAX_PAGES, TEST_MAX_PAGES};

/// Link search: code-search query into the link catalog
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub query: String,
    pub links_path: PathBuf,
    pub max_pages: u32,
    pub page_delay: Duration,
    pub options: RunOptions,
}

impl SearchConfig {
    pub fn new(links_path: impl Into<PathBuf>, options: RunOptions) -> Self {
        let max_pages = if options.test_mode {
            TEST_MAX_PAGES
        } else {
            MAX_PAGES
        };
        Self {
            query: "extension:fmu".to_string(),
            links_path: links_path.into(),
            max_pages,
            page_delay: Duration::from_secs(2),
            options,
        }
    }
}

/// Download: URL list into the download tree and table
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Plain URL list or the link catalog
    pub url_list: PathBuf,
    pub download_dir: PathBuf,
    pub table_path: PathBuf,
    pub options: RunOptions,
}

/// License lookup: repositories of catalogued models into the license table
#[derive(Debug, Clone)]
pub struct LicenseConfig {
    /// Root the model paths are laid out under
    pub download_dir: PathBuf,
    pub table_path: PathBuf,
    pub min_delay: Duration,
    pub options: RunOptions,
}

impl LicenseConfig {
    pub fn new(
        download_dir: impl Into<PathBuf>,
        table_path: impl Into<PathBuf>,
        options: RunOptions,
    ) -> Self {
        Self {
            download_dir: download_dir.into(),
            table_path: table_path.into(),
            min_delay: MIN_LOOKUP_DELAY,
            options,
        }
    }
}
