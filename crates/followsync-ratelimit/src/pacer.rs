//! Request pacing.
//!
//! A [`Pacer`] holds each request until the local token bucket has budget,
//! the minimum spacing since the previous request has passed, and any
//! exhaustion reported by the server has reset.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{BudgetState, RateLimitError, RateLimitHeaders, RequestBudget, TokenBucket};

/// Settings for one [`Pacer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacerConfig {
    pub budget: RequestBudget,

    /// Minimum time between two consecutive requests.
    pub min_interval: Duration,

    /// Longest a single [`Pacer::ready`] call may wait before giving up.
    pub max_wait: Duration,
}

impl PacerConfig {
    #[must_use]
    pub const fn new(budget: RequestBudget, min_interval: Duration, max_wait: Duration) -> Self {
        Self {
            budget,
            min_interval,
            max_wait,
        }
    }
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self::new(
            RequestBudget::twitter_reads(),
            Duration::from_secs(1),
            Duration::from_secs(15 * 60),
        )
    }
}

#[derive(Debug, Default)]
struct Marks {
    last_request: Option<Instant>,
    blocked_until: Option<Instant>,
}

/// Paces requests against one request budget.
#[derive(Debug)]
pub struct Pacer {
    bucket: TokenBucket,
    min_interval: Duration,
    max_wait: Duration,
    marks: Mutex<Marks>,
}

impl Pacer {
    #[must_use]
    pub fn new(config: PacerConfig) -> Self {
        Self {
            bucket: TokenBucket::new(&config.budget),
            min_interval: config.min_interval,
            max_wait: config.max_wait,
            marks: Mutex::new(Marks::default()),
        }
    }

    /// Wait until the next request may go out; returns the time spent waiting.
    pub async fn ready(&self) -> Result<Duration, RateLimitError> {
        let start = Instant::now();

        let hold = self.hold(start);
        if hold > self.max_wait {
            return Err(RateLimitError::WaitExceeded {
                wait: hold,
                max_wait: self.max_wait,
            });
        }
        if !hold.is_zero() {
            debug!(wait_ms = hold.as_millis(), "Pacing request");
            sleep(hold).await;
        }

        self.bucket
            .take(self.max_wait.saturating_sub(start.elapsed()))
            .await?;

        self.marks.lock().last_request = Some(Instant::now());
        Ok(start.elapsed())
    }

    /// Feed back the rate limit headers of a response.
    ///
    /// An exhausted server window holds later requests until its reset.
    pub fn observe(&self, headers: &RateLimitHeaders) {
        if !headers.is_limited() {
            return;
        }
        let Some(wait) = headers.suggested_wait() else {
            return;
        };

        warn!(
            wait_secs = wait.as_secs(),
            limit = ?headers.limit,
            "Server reported rate limit exhausted"
        );
        let until = Instant::now() + wait;
        let mut marks = self.marks.lock();
        if marks.blocked_until.map_or(true, |current| current < until) {
            marks.blocked_until = Some(until);
        }
    }

    /// Snapshot of the local budget.
    #[must_use]
    pub fn state(&self) -> BudgetState {
        self.bucket.state()
    }

    fn hold(&self, now: Instant) -> Duration {
        let marks = self.marks.lock();
        let spacing = marks.last_request.map_or(Duration::ZERO, |last| {
            (last + self.min_interval).saturating_duration_since(now)
        });
        let blocked = marks
            .blocked_until
            .map_or(Duration::ZERO, |until| until.saturating_duration_since(now));
        spacing.max(blocked)
    }
}
