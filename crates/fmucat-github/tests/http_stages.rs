//! Stages against a local HTTP stub standing in for the API and raw hosts.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fmucat_core::ProgressContext;
use fmucat_github::{
    DownloadConfig, DownloadRecord, GitHubClient, LicenseConfig, LicenseRecord, LinkRecord,
    SearchConfig, run_download, run_licenses, run_search,
};
use fmucat_store::{KeyedResultStore, Outcome, Record, RunOptions};

struct Reply {
    status: u16,
    body: String,
}

struct Stub {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

/// `X-RateLimit-*` values sent with every reply.
#[derive(Clone, Copy)]
struct Quota {
    remaining: i64,
    reset: i64,
}

const PLENTY: Quota = Quota {
    remaining: 4999,
    reset: 0,
};

impl Stub {
    fn start(routes: Vec<(&str, u16, &str)>) -> Self {
        Self::start_with_quota(routes, PLENTY)
    }

    /// Serve `routes` (path without query -> reply) until the test process ends.
    fn start_with_quota(routes: Vec<(&str, u16, &str)>, quota: Quota) -> Self {
        let routes: HashMap<String, Reply> = routes
            .into_iter()
            .map(|(path, status, body)| {
                (
                    path.to_string(),
                    Reply {
                        status,
                        body: body.to_string(),
                    },
                )
            })
            .collect();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let mut auth = String::new();
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                        break;
                    }
                    if line.to_ascii_lowercase().starts_with("authorization:") {
                        auth = line.trim().to_string();
                    }
                }
                let target = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
                let path = target.split('?').next().unwrap_or("/").to_string();
                log.lock().unwrap().push(format!("{target} {auth}"));

                let (status, body) = match routes.get(&path) {
                    Some(reply) => (reply.status, reply.body.as_str()),
                    None => (404, "404: Not Found"),
                };
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nX-RateLimit-Remaining: {}\r\nX-RateLimit-Reset: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len(),
                    quota.remaining,
                    quota.reset
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Self { base, requests }
    }

    fn client(&self) -> GitHubClient {
        GitHubClient::new("ghp_test")
            .with_api_base(&self.base)
            .with_raw_base(format!("{}/raw", self.base))
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn quiet() -> ProgressContext {
    ProgressContext::hidden()
}

#[test]
fn license_not_found_is_recorded_as_error() {
    let stub = Stub::start(vec![
        ("/repos/acme/plant", 200, r#"{"full_name":"acme/plant","license":{"key":"mit"}}"#),
        ("/repos/acme/bare", 200, r#"{"full_name":"acme/bare","license":null}"#),
    ]);
    let dir = tempfile::tempdir().unwrap();
    let mut config = LicenseConfig::new(
        "downloads",
        dir.path().join("repository_licenses.csv"),
        RunOptions::default(),
    );
    config.min_delay = Duration::ZERO;

    let models = [
        "downloads/acme/plant/a.fmu",
        "downloads/acme/plant/b.fmu",
        "downloads/acme/bare/c.fmu",
        "downloads/ghost/gone/d.fmu",
    ]
    .map(String::from);
    let stage = run_licenses(&config, &stub.client(), models, &quiet()).unwrap();

    assert_eq!(stage.report.processed, 3);
    assert_eq!(stage.report.stats.succeeded, 2);
    assert_eq!(stage.report.stats.failed, 1);
    assert_eq!(stage.summary.failures.len(), 1);
    assert_eq!(stage.summary.failures[0].key, "ghost/gone");

    let store = KeyedResultStore::<LicenseRecord>::load(&config.table_path).unwrap();
    assert_eq!(store.get("acme/plant").unwrap().license, "mit");
    assert_eq!(store.get("acme/bare").unwrap().license, "none");
    let gone = store.get("ghost/gone").unwrap();
    assert!(gone.license.starts_with("Error: HTTP 404"));
    assert_eq!(gone.outcome(), Outcome::Failed);

    let requests = stub.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.ends_with("ghp_test")));
}

#[test]
fn exhausted_quota_waits_for_reset_and_keeps_results() {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let stub = Stub::start_with_quota(
        vec![
            ("/repos/acme/plant", 200, r#"{"license":{"key":"apache-2.0"}}"#),
            ("/repos/acme/pump", 200, r#"{"license":{"key":"bsd-3-clause"}}"#),
        ],
        Quota {
            remaining: 0,
            reset: now,
        },
    );
    let dir = tempfile::tempdir().unwrap();
    let mut config = LicenseConfig::new(
        "downloads",
        dir.path().join("repository_licenses.csv"),
        RunOptions::default(),
    );
    config.min_delay = Duration::ZERO;

    let models = ["downloads/acme/plant/a.fmu", "downloads/acme/pump/b.fmu"].map(String::from);
    let started = std::time::Instant::now();
    let stage = run_licenses(&config, &stub.client(), models, &quiet()).unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(stage.report.stats.succeeded, 2);
    assert_eq!(stub.requests().len(), 2);
    let store = KeyedResultStore::<LicenseRecord>::load(&config.table_path).unwrap();
    assert_eq!(store.get("acme/plant").unwrap().license, "apache-2.0");
    assert_eq!(store.get("acme/pump").unwrap().license, "bsd-3-clause");
}

fn write_lines(path: &Path, lines: &[&str]) {
    std::fs::write(path, lines.join("\n")).unwrap();
}

#[test]
fn downloads_files_and_records_failures() {
    let stub = Stub::start(vec![("/raw/acme/plant/main/models/Tank.fmu", 200, "PK-tank")]);
    let dir = tempfile::tempdir().unwrap();
    let url_list = dir.path().join("fmu_links.csv");
    write_lines(
        &url_list,
        &[
            "Url",
            "https://github.com/acme/plant/blob/main/models/Tank.fmu",
            "https://github.com/acme/plant/blob/main/models/Missing.fmu",
            "https://github.com/acme",
        ],
    );
    let config = DownloadConfig {
        url_list,
        download_dir: dir.path().join("downloads"),
        table_path: dir.path().join("downloads.csv"),
        options: RunOptions::default(),
    };

    let stage = run_download(&config, &stub.client(), &quiet()).unwrap();
    assert_eq!(stage.report.stats.succeeded, 1);
    assert_eq!(stage.report.stats.failed, 2);

    let tank = config.download_dir.join("acme/plant/models_Tank.fmu");
    assert_eq!(std::fs::read_to_string(&tank).unwrap(), "PK-tank");
    assert!(!config.download_dir.join("acme/plant/models_Missing.fmu").exists());
    assert!(!config.download_dir.join("acme/plant/models_Missing.fmu.part").exists());

    let store = KeyedResultStore::<DownloadRecord>::load(&config.table_path).unwrap();
    let ok = store.get(&tank.to_string_lossy()).unwrap();
    assert_eq!((ok.status, ok.bytes), (Some(200), Some(7)));
    let missing = store
        .get(&config.download_dir.join("acme/plant/models_Missing.fmu").to_string_lossy())
        .unwrap();
    assert_eq!(missing.status, Some(404));
    assert_eq!(missing.error.as_deref(), Some("HTTP 404: 404: Not Found"));
    assert!(store.get("https://github.com/acme").unwrap().error.is_some());
}

#[test]
fn existing_download_is_skipped_without_request() {
    let stub = Stub::start(vec![]);
    let dir = tempfile::tempdir().unwrap();
    let url_list = dir.path().join("urls.txt");
    write_lines(&url_list, &["https://github.com/acme/plant/blob/main/Tank.fmu"]);
    let config = DownloadConfig {
        url_list,
        download_dir: dir.path().join("downloads"),
        table_path: dir.path().join("downloads.csv"),
        options: RunOptions::default(),
    };
    let target = config.download_dir.join("acme/plant/Tank.fmu");
    std::fs::create_dir_all(target.parent().unwrap()).unwrap();
    std::fs::write(&target, "already here").unwrap();

    let stage = run_download(&config, &stub.client(), &quiet()).unwrap();
    assert_eq!(stage.report.processed, 0);
    assert_eq!(stage.report.stats.skipped, 1);
    assert!(stub.requests().is_empty());
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "already here");
}

#[test]
fn search_records_links_once() {
    let page = r#"{"total_count":2,"incomplete_results":false,"items":[
        {"html_url":"https://github.com/acme/plant/blob/abc/Tank.fmu"},
        {"html_url":"https://github.com/acme/other/blob/def/Pump.fmu"}]}"#;
    let stub = Stub::start(vec![("/search/code", 200, page)]);
    let dir = tempfile::tempdir().unwrap();
    let mut config = SearchConfig::new(dir.path().join("fmu_links.csv"), RunOptions::default());
    config.page_delay = Duration::ZERO;

    let first = run_search(&config, &stub.client(), &quiet()).unwrap();
    assert_eq!(first.report.stats.succeeded, 2);
    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("/search/code?q=extension%3Afmu&per_page=100&page=1"));

    let second = run_search(&config, &stub.client(), &quiet()).unwrap();
    assert_eq!(second.report.processed, 0);
    assert_eq!(second.report.stats.skipped, 2);

    let store = KeyedResultStore::<LinkRecord>::load(&config.links_path).unwrap();
    assert_eq!(store.len(), 2);
    let text = std::fs::read_to_string(&config.links_path).unwrap();
    assert!(text.starts_with("Url\n"));
}
