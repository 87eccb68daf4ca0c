//! GitHub rate-limit headers

use std::time::Duration;

use fmucat_core::HttpResponse;

/// `X-RateLimit-*` values of one response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: Option<i64>,
    /// Epoch seconds at which the quota refills
    pub reset: Option<i64>,
}

impl RateLimit {
    pub fn from_response(resp: &HttpResponse) -> Self {
        Self {
            remaining: resp.header_i64("X-RateLimit-Remaining"),
            reset: resp.header_i64("X-RateLimit-Reset"),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Pause owed after a request: `min` always, plus the time until reset
    /// when the quota is used up.
    pub fn wait(&self, now_epoch: i64, min: Duration) -> Duration {
        match (self.is_exhausted(), self.reset) {
            (true, Some(reset)) => min + Duration::from_secs(reset.saturating_sub(now_epoch).max(0) as u64),
            _ => min,
        }
    }

    /// Sleep for [`wait`](Self::wait), logging long pauses.
    pub fn pause(&self, min: Duration) {
        let wait = self.wait(chrono::Utc::now().timestamp(), min);
        if wait > min {
            log::warn!("Rate limit exceeded, sleeping {}s", wait.as_secs());
        }
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
}
