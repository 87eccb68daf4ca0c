//! Repository license lookup processor

use std::time::Duration;

use fmucat_core::{HttpResponse, StreamError};
use fmucat_store::ItemProcessor;
use serde::Deserialize;

use crate::client::GitHubClient;
use crate::rate_limit::RateLimit;
use crate::records::{LICENSE_ERROR_PREFIX, LicenseRecord};

/// Pause after every lookup, even with quota left
pub const MIN_LOOKUP_DELAY: Duration = Duration::from_millis(100);

/// Reported when the repository declares no license
pub const NO_LICENSE: &str = "none";

#[derive(Deserialize)]
struct RepositoryInfo {
    license: Option<LicenseInfo>,
}

#[derive(Deserialize)]
struct LicenseInfo {
    key: String,
}

/// License column for a lookup result.
pub fn license_from_response(result: &Result<HttpResponse, StreamError>) -> String {
    match result {
        Ok(resp) if resp.is_success() => match serde_json::from_str::<RepositoryInfo>(&resp.body) {
            Ok(info) => info
                .license
                .map_or_else(|| NO_LICENSE.to_string(), |l| l.key),
            Err(e) => format!("{LICENSE_ERROR_PREFIX} invalid repository JSON: {e}"),
        },
        Ok(resp) => format!(
            "{LICENSE_ERROR_PREFIX} HTTP {}: {}",
            resp.status,
            resp.body.trim()
        ),
        Err(e) => format!("{LICENSE_ERROR_PREFIX} {e}"),
    }
}

/// Looks up one `owner/repo` per item.
pub struct LicenseFetcher<'a> {
    client: &'a GitHubClient,
    min_delay: Duration,
}

impl<'a> LicenseFetcher<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self {
            client,
            min_delay: MIN_LOOKUP_DELAY,
        }
    }

    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }
}

impl ItemProcessor for LicenseFetcher<'_> {
    type Item = String;
    type Record = LicenseRecord;

    fn key(&self, repository: &String) -> String {
        repository.clone()
    }

    fn process(&mut self, repository: String, _key: String) -> LicenseRecord {
        let result = self.client.repository(&repository);
        let license = license_from_response(&result);
        log::debug!("{repository}: {license}");

        match &result {
            Ok(resp) => RateLimit::from_response(resp).pause(self.min_delay),
            Err(_) => RateLimit::default().pause(self.min_delay),
        }

        LicenseRecord {
            repository,
            license,
        }
    }
}
