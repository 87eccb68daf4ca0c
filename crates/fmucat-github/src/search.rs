//! Code-search link source
//!
//! [`CodeSearch`] pages through `GET /search/code` lazily, yielding the
//! `html_url` of every hit. The API serves at most 1000 results, 100 per page.

use std::collections::VecDeque;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use fmucat_core::is_shutdown_requested;
use fmucat_store::ItemProcessor;
use serde::Deserialize;

use crate::client::GitHubClient;
use crate::rate_limit::RateLimit;
use crate::records::LinkRecord;

pub const PER_PAGE: usize = 100;
pub const MAX_PAGES: u32 = 10;
pub const TEST_MAX_PAGES: u32 = 3;

const RATE_LIMIT_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
struct SearchPage {
    total_count: u64,
    #[serde(default)]
    incomplete_results: bool,
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    html_url: String,
}

/// Counters of one search.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub pages: u32,
    pub links: usize,
    /// Pages with fewer than [`PER_PAGE`] hits before the last one
    pub short_pages: u32,
    pub empty_pages: u32,
    pub total_count: Option<u64>,
    /// Why paging stopped early, if it did
    pub error: Option<String>,
}

/// Lazy iterator over code-search hits.
pub struct CodeSearch<'a> {
    client: &'a GitHubClient,
    query: String,
    max_pages: u32,
    page_delay: Duration,
    next_page: u32,
    buffer: VecDeque<String>,
    done: bool,
    stats: SearchStats,
}

impl<'a> CodeSearch<'a> {
    pub fn new(client: &'a GitHubClient, query: impl Into<String>) -> Self {
        Self {
            client,
            query: query.into(),
            max_pages: MAX_PAGES,
            page_delay: Duration::from_secs(2),
            next_page: 1,
            buffer: VecDeque::new(),
            done: false,
            stats: SearchStats::default(),
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn page_url(&self, page: u32) -> Result<reqwest::Url> {
        let base = format!("{}/search/code", self.client.api_base());
        let per_page = PER_PAGE.to_string();
        let page = page.to_string();
        reqwest::Url::parse_with_params(
            &base,
            &[
                ("q", self.query.as_str()),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
            ],
        )
        .with_context(|| format!("Invalid search URL {base}"))
    }

    fn fetch_page(&self, page: u32) -> Result<SearchPage> {
        let url = self.page_url(page)?;
        for attempt in 0..=RATE_LIMIT_RETRIES {
            let resp = self.client.get(url.as_str())?;
            let limit = RateLimit::from_response(&resp);

            if resp.is_success() {
                if limit.is_exhausted() {
                    limit.pause(Duration::ZERO);
                }
                return serde_json::from_str(&resp.body).context("Invalid search response JSON");
            }
            if matches!(resp.status, 403 | 429) && limit.is_exhausted() && attempt < RATE_LIMIT_RETRIES {
                limit.pause(self.page_delay);
                continue;
            }
            bail!("HTTP {}: {}", resp.status, resp.body.trim());
        }
        bail!("Still rate limited after {RATE_LIMIT_RETRIES} retries")
    }

    fn load_next_page(&mut self) {
        if self.next_page > self.max_pages {
            log::info!("Search: stopping after {} pages", self.max_pages);
            self.done = true;
            return;
        }
        if is_shutdown_requested() {
            self.done = true;
            return;
        }
        if self.next_page > 1 && !self.page_delay.is_zero() {
            std::thread::sleep(self.page_delay);
        }

        let page = self.next_page;
        self.next_page += 1;
        let result = match self.fetch_page(page) {
            Ok(result) => result,
            Err(e) => {
                log::error!("Search page {page} failed: {e:#}");
                self.stats.error = Some(format!("page {page}: {e:#}"));
                self.done = true;
                return;
            }
        };

        self.stats.pages += 1;
        self.stats.total_count = Some(result.total_count);
        if result.incomplete_results {
            log::warn!("Search page {page}: results incomplete");
        }

        let n = result.items.len();
        let seen = (page as u64 - 1) * PER_PAGE as u64 + n as u64;
        let last = n == 0 || seen >= result.total_count;
        if n == 0 {
            self.stats.empty_pages += 1;
        } else if n < PER_PAGE && !last {
            self.stats.short_pages += 1;
        }
        log::debug!("Search page {page}: {n} links ({seen} of {})", result.total_count);

        self.stats.links += n;
        self.buffer.extend(result.items.into_iter().map(|item| item.html_url));
        if last {
            self.done = true;
        }
    }
}

impl Iterator for CodeSearch<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(url) = self.buffer.pop_front() {
                return Some(url);
            }
            if self.done {
                return None;
            }
            self.load_next_page();
        }
    }
}

/// Records each found link as is.
#[derive(Debug, Default)]
pub struct LinkRecorder;

impl ItemProcessor for LinkRecorder {
    type Item = String;
    type Record = LinkRecord;

    fn key(&self, url: &String) -> String {
        url.clone()
    }

    fn process(&mut self, url: String, _key: String) -> LinkRecord {
        LinkRecord { url }
    }
}
