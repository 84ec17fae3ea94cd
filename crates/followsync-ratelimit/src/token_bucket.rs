//! Fixed-window token bucket.
//!
//! The bucket starts full and receives the budget's request count once per
//! window. Refills advance whole windows at a time, so the unused part of a
//! window carries over instead of restarting at the moment of the refill.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::time::sleep;

use crate::{BudgetState, RateLimitError, RequestBudget};

#[derive(Debug)]
struct Fill {
    tokens: u32,
    window_start: Instant,
}

/// One token per request, refilled per window.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    per_window: u32,
    window: Duration,
    fill: Mutex<Fill>,
}

impl TokenBucket {
    #[must_use]
    pub fn new(budget: &RequestBudget) -> Self {
        let capacity = budget.capacity();
        Self {
            capacity,
            per_window: budget.requests,
            window: budget.window,
            fill: Mutex::new(Fill {
                tokens: capacity,
                window_start: Instant::now(),
            }),
        }
    }

    /// Take a token if one is available.
    ///
    /// On failure, returns the time until the next refill.
    pub fn try_take(&self) -> Result<(), Duration> {
        let now = Instant::now();
        let mut fill = self.fill.lock();
        self.refill(&mut fill, now);

        if fill.tokens == 0 {
            return Err(self.until_refill(&fill, now));
        }
        fill.tokens -= 1;
        Ok(())
    }

    /// Take a token, sleeping through refills for at most `max_wait`.
    ///
    /// Returns how long the call waited.
    pub async fn take(&self, max_wait: Duration) -> Result<Duration, RateLimitError> {
        let start = Instant::now();
        loop {
            let wait = match self.try_take() {
                Ok(()) => return Ok(start.elapsed()),
                Err(wait) => wait,
            };

            let total = start.elapsed() + wait;
            if total > max_wait {
                return Err(RateLimitError::WaitExceeded {
                    wait: total,
                    max_wait,
                });
            }
            sleep(wait).await;
        }
    }

    #[must_use]
    pub fn state(&self) -> BudgetState {
        let now = Instant::now();
        let mut fill = self.fill.lock();
        self.refill(&mut fill, now);

        BudgetState {
            limit: self.capacity,
            remaining: fill.tokens,
            reset_after: self.until_refill(&fill, now),
            is_limited: fill.tokens == 0,
        }
    }

    fn refill(&self, fill: &mut Fill, now: Instant) {
        if self.window.is_zero() {
            fill.tokens = self.capacity;
            fill.window_start = now;
            return;
        }

        let elapsed = now.saturating_duration_since(fill.window_start);
        let windows = elapsed.as_nanos() / self.window.as_nanos();
        if windows == 0 {
            return;
        }

        let windows = u32::try_from(windows).unwrap_or(u32::MAX);
        fill.tokens = fill
            .tokens
            .saturating_add(self.per_window.saturating_mul(windows))
            .min(self.capacity);
        fill.window_start += self.window.saturating_mul(windows);
    }

    fn until_refill(&self, fill: &Fill, now: Instant) -> Duration {
        (fill.window_start + self.window).saturating_duration_since(now)
    }
}
