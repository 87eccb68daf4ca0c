//! Authenticated GitHub access

use std::path::Path;

use anyhow::Result;
use fmucat_core::{Downloaded, HttpResponse, StreamError, download_to_file, http_get};

use crate::url::SourceUrl;

/// Environment variable holding the personal access token
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const TOKEN_HELP: &str = "https://docs.github.com/en/authentication/keeping-your-account-and-data-secure/managing-your-personal-access-tokens";

const ACCEPT: &str = "application/vnd.github+json";

/// Pick the configured token, falling back to `GITHUB_TOKEN`.
pub fn resolve_token(configured: Option<&str>) -> Result<String> {
    if let Some(token) = configured.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }
    match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => anyhow::bail!(
            "Environment variable {TOKEN_ENV} must be set to a GitHub personal access token. See {TOKEN_HELP}"
        ),
    }
}

/// GitHub endpoints plus the credential sent with every request.
#[derive(Clone)]
pub struct GitHubClient {
    api_base: String,
    raw_base: String,
    authorization: String,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base)
            .field("raw_base", &self.raw_base)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    pub const API_BASE: &'static str = "https://api.github.com";
    pub const RAW_BASE: &'static str = "https://raw.githubusercontent.com";

    pub fn new(token: &str) -> Self {
        Self {
            api_base: Self::API_BASE.to_string(),
            raw_base: Self::RAW_BASE.to_string(),
            authorization: format!("token {token}"),
        }
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_raw_base(mut self, base: impl Into<String>) -> Self {
        self.raw_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn raw_base(&self) -> &str {
        &self.raw_base
    }

    fn headers(&self) -> [(&str, &str); 2] {
        [("Authorization", self.authorization.as_str()), ("Accept", ACCEPT)]
    }

    /// GET an absolute API URL. Non-2xx answers are returned, not errors.
    pub fn get(&self, url: &str) -> Result<HttpResponse, StreamError> {
        log::debug!("GET {url}");
        http_get(url, &self.headers())
    }

    /// `GET /repos/{owner}/{repo}`
    pub fn repository(&self, repository: &str) -> Result<HttpResponse, StreamError> {
        self.get(&format!("{}/repos/{repository}", self.api_base))
    }

    /// Stream the raw contents of `source` to `dest`.
    pub fn download(&self, source: &SourceUrl, dest: &Path) -> Result<Downloaded, StreamError> {
        let url = source.raw_url(&self.raw_base);
        log::debug!("Downloading {url} to {}", dest.display());
        download_to_file(&url, &[("Authorization", self.authorization.as_str())], dest)
    }
}
