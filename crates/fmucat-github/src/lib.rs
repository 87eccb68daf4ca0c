//! fmucat-github: GitHub-facing pipeline stages
//!
//! - **search**: page through the code-search API and record every file link
//! - **download**: fetch each linked file from the raw host into a local tree
//! - **licenses**: look up the license of every repository that contributed a model
//!
//! All three feed the shared [`fmucat_store::BatchRunner`], so every stage is
//! resumable and skips work already recorded.

pub mod client;
pub mod config;
pub mod download;
pub mod license;
pub mod rate_limit;
pub mod records;
pub mod repos;
pub mod runner;
pub mod search;
pub mod url;
pub mod urls;

pub use client::{GitHubClient, resolve_token};
pub use config::{DownloadConfig, LicenseConfig, SearchConfig};
pub use download::Downloader;
pub use license::LicenseFetcher;
pub use rate_limit::RateLimit;
pub use records::{DownloadRecord, LicenseRecord, LinkRecord};
pub use repos::{RepoLayout, distinct_repositories};
pub use runner::{run_download, run_licenses, run_search};
pub use search::{CodeSearch, LinkRecorder, SearchStats};
pub use url::SourceUrl;
pub use urls::{read_url_list, url_lines};
