//! Blocking HTTP bridge over the shared async reqwest client.
//!
//! Every call runs on [`SHARED_RUNTIME`] and blocks the calling thread, so the
//! pipelines stay strictly sequential while still using async reqwest.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::HeaderMap;

/// Stall detection for streamed bodies (no chunk within this window = stall)
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub rejects API requests without a User-Agent
const USER_AGENT: &str = concat!("fmucat/", env!("CARGO_PKG_VERSION"));

/// Failure of a request or of writing its body.
#[derive(Debug)]
pub enum StreamError {
    /// `status` is `None` when no response arrived; otherwise `message` is the body
    Http {
        status: Option<u16>,
        message: String,
    },
    Io(io::Error),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { status: Some(code), message } => write!(f, "HTTP {code}: {message}"),
            Self::Http { status: None, message } => write!(f, "HTTP error: {message}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Http { .. } => None,
        }
    }
}

impl StreamError {
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        Self::Http {
            status: err.status().map(|code| code.as_u16()),
            message: err.to_string(),
        }
    }

    /// HTTP status code, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            Self::Io(_) => None,
        }
    }
}

impl From<io::Error> for StreamError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// One pooled client for every request.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(2)
        .build()
        .expect("reqwest client configuration is static")
});

/// Runtime the blocking wrappers drive reqwest on.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("cannot start the HTTP runtime")
});

/// Fully buffered response. Non-2xx statuses are returned, not turned into errors,
/// so callers can read rate-limit headers and the error body.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse an integer header such as `X-RateLimit-Remaining`
    pub fn header_i64(&self, name: &str) -> Option<i64> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    }
}

fn build_request(url: &str, headers: &[(&str, &str)]) -> reqwest::RequestBuilder {
    headers
        .iter()
        .fold(SHARED_CLIENT.get(url), |req, (name, value)| req.header(*name, *value))
}

/// Blocking GET returning status, headers and body text.
pub fn http_get(url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, StreamError> {
    let request = build_request(url, headers);
    SHARED_RUNTIME.handle().block_on(async {
        let response = request
            .send()
            .await
            .map_err(|err| StreamError::from_reqwest(&err))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|err| StreamError::from_reqwest(&err))?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    })
}

/// Completed download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Downloaded {
    pub status: u16,
    pub bytes: u64,
}

/// Sibling path used while a download is in flight
pub fn part_path(dest: &Path) -> PathBuf {
    let mut s = dest.as_os_str().to_owned();
    s.push(".part");
    PathBuf::from(s)
}

/// Stream a GET response body to `dest`, creating parent directories.
///
/// The body goes to `<dest>.part` first and is renamed on completion, so
/// `dest` only ever exists as a complete file. Non-2xx responses become
/// `StreamError::Http` carrying the status and the response body.
pub fn download_to_file(
    url: &str,
    headers: &[(&str, &str)],
    dest: &Path,
) -> Result<Downloaded, StreamError> {
    let part = part_path(dest);
    let request = build_request(url, headers);
    let result = SHARED_RUNTIME
        .handle()
        .block_on(async { stream_body(request, dest, &part).await });
    if result.is_err() && part.exists() {
        if let Err(e) = std::fs::remove_file(&part) {
            log::warn!("Cannot remove partial download {}: {e}", part.display());
        }
    }
    result
}

async fn stream_body(
    request: reqwest::RequestBuilder,
    dest: &Path,
    part: &Path,
) -> Result<Downloaded, StreamError> {
    let response = request
        .send()
        .await
        .map_err(|err| StreamError::from_reqwest(&err))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StreamError::Http {
            status: Some(status.as_u16()),
            message: body.trim().to_string(),
        });
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = io::BufWriter::new(std::fs::File::create(part)?);
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    loop {
        let next = tokio::time::timeout(READ_TIMEOUT, stream.next())
            .await
            .map_err(|_| {
                StreamError::Io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "read timeout (no data for 30s)",
                ))
            })?;
        let Some(chunk) = next else { break };
        let chunk = chunk.map_err(|err| StreamError::from_reqwest(&err))?;
        file.write_all(&chunk)?;
        written += chunk.len() as u64;
    }

    file.flush()?;
    drop(file);
    std::fs::rename(part, dest)?;
    Ok(Downloaded {
        status: status.as_u16(),
        bytes: written,
    })
}
