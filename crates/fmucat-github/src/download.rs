//! File download processor

use std::path::{Path, PathBuf};
use std::time::Duration;

use fmucat_store::ItemProcessor;

use crate::client::GitHubClient;
use crate::records::DownloadRecord;
use crate::url::SourceUrl;

/// Pause between downloads. The raw host sends no rate-limit headers.
pub const DOWNLOAD_DELAY: Duration = Duration::from_secs(1);

/// Downloads one linked file per item into `<download_dir>/<owner>/<repo>/`.
pub struct Downloader<'a> {
    client: &'a GitHubClient,
    download_dir: PathBuf,
}

impl<'a> Downloader<'a> {
    pub fn new(client: &'a GitHubClient, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            download_dir: download_dir.into(),
        }
    }
}

impl ItemProcessor for Downloader<'_> {
    type Item = String;
    type Record = DownloadRecord;

    /// Local target path, or the line itself when it is not a file link.
    fn key(&self, line: &String) -> String {
        match SourceUrl::parse(line) {
            Ok(url) => url.local_path(&self.download_dir).to_string_lossy().into_owned(),
            Err(_) => line.clone(),
        }
    }

    /// A finished download is on disk under its key; partial ones only
    /// exist as `.part` files.
    fn is_complete(&self, key: &str) -> bool {
        Path::new(key).is_file()
    }

    fn process(&mut self, line: String, key: String) -> DownloadRecord {
        let source = match SourceUrl::parse(&line) {
            Ok(source) => source,
            Err(e) => return DownloadRecord::failed(key, &line, None, e.to_string()),
        };
        match self.client.download(&source, Path::new(&key)) {
            Ok(done) => {
                log::debug!("{key}: {} bytes", done.bytes);
                DownloadRecord {
                    local_path: key,
                    source_url: line,
                    status: Some(i64::from(done.status)),
                    bytes: Some(done.bytes as i64),
                    error: None,
                }
            }
            Err(e) => DownloadRecord::failed(key, &line, e.status(), e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use fmucat_store::Record;

    use super::*;

    const LINK: &str = "https://github.com/acme/plant/blob/main/models/Tank.fmu";

    fn unreachable_client() -> GitHubClient {
        // Port 9 (discard) is closed on test machines; any request fails fast
        GitHubClient::new("t").with_raw_base("http://127.0.0.1:9")
    }

    #[test]
    fn key_is_local_path() {
        let client = unreachable_client();
        let d = Downloader::new(&client, "downloads");
        assert_eq!(d.key(&LINK.to_string()), "downloads/acme/plant/models_Tank.fmu");
    }

    #[test]
    fn malformed_line_is_its_own_key_and_fails() {
        let client = unreachable_client();
        let mut d = Downloader::new(&client, "downloads");
        let line = "https://github.com/acme".to_string();
        let key = d.key(&line);
        assert_eq!(key, line);

        let record = d.process(line.clone(), key);
        assert!(record.outcome().is_failed());
        assert_eq!(record.source_url, line);
        assert!(record.error.unwrap().starts_with("Malformed source URL"));
    }

    #[test]
    fn existing_file_is_complete() {
        let dir = tempfile::tempdir().unwrap();
        let client = unreachable_client();
        let d = Downloader::new(&client, dir.path());
        let key = d.key(&LINK.to_string());
        assert!(!d.is_complete(&key));

        std::fs::create_dir_all(Path::new(&key).parent().unwrap()).unwrap();
        std::fs::write(&key, b"PK").unwrap();
        assert!(d.is_complete(&key));
    }

    #[test]
    fn transport_error_becomes_failed_record() {
        let dir = tempfile::tempdir().unwrap();
        let client = unreachable_client();
        let mut d = Downloader::new(&client, dir.path());
        let key = d.key(&LINK.to_string());

        let record = d.process(LINK.to_string(), key.clone());
        assert!(record.outcome().is_failed());
        assert_eq!(record.local_path, key);
        assert_eq!(record.status, None);
        assert!(!Path::new(&key).exists());
    }
}
