//! Rows of the link, download and license tables

use fmucat_store::{Outcome, Record};
use serde::{Deserialize, Serialize};

/// One file link found by search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(rename = "Url")]
    pub url: String,
}

impl Record for LinkRecord {
    const COLUMNS: &'static [&'static str] = &["Url"];

    fn key(&self) -> &str {
        &self.url
    }

    fn outcome(&self) -> Outcome {
        Outcome::Succeeded
    }

    fn diagnostic(&self) -> Option<&str> {
        None
    }
}

/// One download attempt. Failed when `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    #[serde(rename = "Local Path")]
    pub local_path: String,
    #[serde(rename = "Source Url")]
    pub source_url: String,
    #[serde(rename = "Status")]
    pub status: Option<i64>,
    #[serde(rename = "Bytes")]
    pub bytes: Option<i64>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

impl DownloadRecord {
    pub fn failed(local_path: String, source_url: &str, status: Option<u16>, error: String) -> Self {
        Self {
            local_path,
            source_url: source_url.to_string(),
            status: status.map(i64::from),
            bytes: None,
            error: Some(if error.is_empty() {
                "unknown error".to_string()
            } else {
                error
            }),
        }
    }
}

impl Record for DownloadRecord {
    const COLUMNS: &'static [&'static str] = &["Local Path", "Source Url", "Status", "Bytes", "Error"];

    fn key(&self) -> &str {
        &self.local_path
    }

    fn outcome(&self) -> Outcome {
        match self.error {
            Some(_) => Outcome::Failed,
            None => Outcome::Succeeded,
        }
    }

    fn diagnostic(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Prefix marking a license lookup that did not produce a license.
pub const LICENSE_ERROR_PREFIX: &str = "Error:";

/// License of one repository, or an `Error: ...` diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    #[serde(rename = "Repository")]
    pub repository: String,
    #[serde(rename = "License")]
    pub license: String,
}

impl Record for LicenseRecord {
    const COLUMNS: &'static [&'static str] = &["Repository", "License"];

    fn key(&self) -> &str {
        &self.repository
    }

    fn outcome(&self) -> Outcome {
        if self.license.starts_with(LICENSE_ERROR_PREFIX) {
            Outcome::Failed
        } else {
            Outcome::Succeeded
        }
    }

    fn diagnostic(&self) -> Option<&str> {
        self.outcome().is_failed().then_some(self.license.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_of<R: Record>(record: R) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.serialize(record).unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        out.lines().next().unwrap().to_string()
    }

    #[test]
    fn headers_match_columns() {
        assert_eq!(
            header_of(LinkRecord { url: "u".into() }),
            LinkRecord::COLUMNS.join(",")
        );
        assert_eq!(
            header_of(DownloadRecord::failed("p".into(), "u", Some(404), "HTTP 404".into())),
            DownloadRecord::COLUMNS.join(",")
        );
        assert_eq!(
            header_of(LicenseRecord {
                repository: "o/r".into(),
                license: "mit".into()
            }),
            LicenseRecord::COLUMNS.join(",")
        );
    }

    #[test]
    fn license_outcome_by_prefix() {
        let ok = LicenseRecord {
            repository: "o/r".into(),
            license: "none".into(),
        };
        let bad = LicenseRecord {
            repository: "o/r".into(),
            license: "Error: HTTP 404: Not Found".into(),
        };
        assert_eq!(ok.outcome(), Outcome::Succeeded);
        assert_eq!(ok.diagnostic(), None);
        assert_eq!(bad.outcome(), Outcome::Failed);
        assert_eq!(bad.diagnostic(), Some("Error: HTTP 404: Not Found"));
    }

    #[test]
    fn download_outcome_by_error() {
        let failed = DownloadRecord::failed("p".into(), "u", None, "IO error: disk full".into());
        assert_eq!(failed.outcome(), Outcome::Failed);
        assert_eq!(failed.status, None);
    }

    #[test]
    fn blank_download_error_stays_failed() {
        let failed = DownloadRecord::failed("p".into(), "u", Some(500), String::new());
        assert_eq!(failed.outcome(), Outcome::Failed);
        assert_eq!(failed.diagnostic(), Some("unknown error"));
    }
}
