//! Rate limit response headers.
//!
//! Twitter reports its window as `x-rate-limit-limit`,
//! `x-rate-limit-remaining` and `x-rate-limit-reset`, the last being a Unix
//! timestamp rather than a countdown. A 429 may also carry `retry-after` in
//! seconds.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Rate limit information found on one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    /// Unix time at which the window resets.
    pub reset_at: Option<u64>,
    /// Time left until `reset_at`, measured when the headers were read.
    pub reset_after: Option<Duration>,
    pub retry_after: Option<Duration>,
}

impl RateLimitHeaders {
    /// Read headers from `(name, value)` pairs; names match case-insensitively
    /// and unrelated headers are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self::from_pairs_at(pairs, now)
    }

    /// [`Self::from_pairs`] against a fixed clock reading.
    pub fn from_pairs_at<I, K, V>(pairs: I, now_secs: u64) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut parsed = Self::default();
        for (name, value) in pairs {
            let value = value.as_ref().trim();
            match name.as_ref().to_ascii_lowercase().as_str() {
                "x-rate-limit-limit" | "x-ratelimit-limit" => parsed.limit = value.parse().ok(),
                "x-rate-limit-remaining" | "x-ratelimit-remaining" => {
                    parsed.remaining = value.parse().ok();
                }
                "x-rate-limit-reset" | "x-ratelimit-reset" => {
                    parsed.reset_at = value.parse().ok();
                    parsed.reset_after = parsed
                        .reset_at
                        .map(|at: u64| Duration::from_secs(at.saturating_sub(now_secs)));
                }
                "retry-after" => parsed.retry_after = value.parse().ok().map(Duration::from_secs),
                _ => {}
            }
        }
        parsed
    }

    /// How long to hold off, preferring an explicit `retry-after`.
    #[must_use]
    pub fn suggested_wait(&self) -> Option<Duration> {
        self.retry_after.or(self.reset_after)
    }

    /// Whether the server says the window is used up.
    #[must_use]
    pub fn is_limited(&self) -> bool {
        self.remaining == Some(0) || self.retry_after.is_some()
    }
}
