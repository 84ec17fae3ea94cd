//! followsync rate limiting
//!
//! Keeps platform clients inside the API's published request budgets.
//! A [`Pacer`] combines a [`TokenBucket`] sized to a [`RequestBudget`], a
//! minimum spacing between requests, and whatever exhaustion the server
//! reports through [`RateLimitHeaders`]. [`ExponentialBackoff`] supplies the
//! delays between retries of transient failures.
//!
//! ```rust,ignore
//! use followsync_ratelimit::{Pacer, PacerConfig, RateLimitHeaders};
//!
//! let pacer = Pacer::new(PacerConfig::default());
//! pacer.ready().await?;
//! let response = send().await;
//! pacer.observe(&RateLimitHeaders::from_pairs(response_headers));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod backoff;
mod budget;
mod headers;
mod pacer;
mod token_bucket;

use std::time::Duration;

pub use backoff::ExponentialBackoff;
pub use budget::{BudgetState, RequestBudget};
pub use headers::RateLimitHeaders;
pub use pacer::{Pacer, PacerConfig};
pub use token_bucket::TokenBucket;

/// Why a request could not be paced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    /// The next slot is further away than the caller is willing to wait.
    #[error("next request slot is {wait:?} away, longer than the {max_wait:?} limit")]
    WaitExceeded { wait: Duration, max_wait: Duration },

    /// The budget cannot admit any request.
    #[error("invalid request budget: {0}")]
    InvalidBudget(String),
}

impl RateLimitError {
    /// How long until a request would be admitted, when known.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::WaitExceeded { wait, .. } => Some(*wait),
            Self::InvalidBudget(_) => None,
        }
    }
}
