//! Request budgets and their snapshots.

use std::time::Duration;

use crate::RateLimitError;

/// How many requests an endpoint family admits per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestBudget {
    /// Requests granted at the start of every window.
    pub requests: u32,

    /// Window length.
    pub window: Duration,

    /// Most requests that may be banked; defaults to `requests`.
    pub burst: Option<u32>,
}

impl RequestBudget {
    #[must_use]
    pub const fn new(requests: u32, window: Duration) -> Self {
        Self {
            requests,
            window,
            burst: None,
        }
    }

    /// Let up to `burst` requests accumulate.
    #[must_use]
    pub const fn with_burst(mut self, burst: u32) -> Self {
        self.burst = Some(burst);
        self
    }

    /// Bucket capacity.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.burst.unwrap_or(self.requests)
    }

    /// Follower/following listings: 15 requests per 15 minutes.
    #[must_use]
    pub const fn twitter_reads() -> Self {
        Self::new(15, Duration::from_secs(15 * 60))
    }

    /// Follow/unfollow: 50 requests per 15 minutes.
    #[must_use]
    pub const fn twitter_writes() -> Self {
        Self::new(50, Duration::from_secs(15 * 60))
    }

    /// Reject budgets that would never admit a request.
    pub fn validate(&self) -> Result<(), RateLimitError> {
        if self.requests == 0 {
            return Err(RateLimitError::InvalidBudget(
                "requests per window must be at least 1".into(),
            ));
        }
        if self.window.is_zero() {
            return Err(RateLimitError::InvalidBudget("window must be non-zero".into()));
        }
        if self.capacity() == 0 {
            return Err(RateLimitError::InvalidBudget("burst must be at least 1".into()));
        }
        Ok(())
    }
}

/// Point-in-time view of a local budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetState {
    pub limit: u32,
    pub remaining: u32,
    /// Time until the next refill.
    pub reset_after: Duration,
    pub is_limited: bool,
}
