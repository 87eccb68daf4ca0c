//! GitHub file links

use std::fmt;
use std::path::{Path, PathBuf};

/// A `https://<host>/<owner>/<repo>/blob/<revision>/<path...>` file link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl {
    pub owner: String,
    pub repo: String,
    pub revision: String,
    pub path: Vec<String>,
}

/// Why a line is not a usable file link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedUrl(pub String);

impl fmt::Display for MalformedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Malformed source URL: {}", self.0)
    }
}

impl std::error::Error for MalformedUrl {}

fn usable(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".."
}

impl SourceUrl {
    pub fn parse(line: &str) -> Result<Self, MalformedUrl> {
        let malformed = |why: &str| MalformedUrl(why.to_string());
        let rest = line
            .trim()
            .strip_prefix("https://")
            .or_else(|| line.trim().strip_prefix("http://"))
            .ok_or_else(|| malformed("expected an http(s) URL"))?;
        // Query strings and fragments are not part of the file path
        let rest = rest.split(['?', '#']).next().unwrap_or_default();

        let mut parts = rest.split('/');
        let _host = parts.next().filter(|h| !h.is_empty()).ok_or_else(|| malformed("missing host"))?;
        let owner = parts.next().filter(|s| usable(s)).ok_or_else(|| malformed("missing owner"))?;
        let repo = parts.next().filter(|s| usable(s)).ok_or_else(|| malformed("missing repository"))?;
        if parts.next() != Some("blob") {
            return Err(malformed("expected /blob/ after the repository"));
        }
        let revision = parts.next().filter(|s| usable(s)).ok_or_else(|| malformed("missing revision"))?;
        let path: Vec<String> = parts.map(String::from).collect();
        if path.is_empty() || !path.iter().all(|s| usable(s)) {
            return Err(malformed("missing or invalid file path"));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            revision: revision.to_string(),
            path,
        })
    }

    /// `owner/repo`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// `<download_dir>/<owner>/<repo>/<path segments joined by "_">`
    pub fn local_path(&self, download_dir: &Path) -> PathBuf {
        download_dir
            .join(&self.owner)
            .join(&self.repo)
            .join(self.path.join("_"))
    }

    /// `<raw_base>/<owner>/<repo>/<revision>/<path...>`
    pub fn raw_url(&self, raw_base: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            raw_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.revision,
            self.path.join("/")
        )
    }
}
