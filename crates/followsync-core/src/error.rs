//! Platform-neutral errors reported by [`SocialGraph`](crate::SocialGraph) implementations.

use std::time::Duration;

use thiserror::Error;

/// A failed call against the social graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The user (or relationship) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials were rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The platform refused the operation (protected account, blocked, suspended).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Rate limit exhausted beyond what the client was willing to wait out.
    #[error("rate limited{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// Network or protocol failure before a platform answer was obtained.
    #[error("transport error: {0}")]
    Transport(String),

    /// Any other platform-reported failure.
    #[error("platform error {status}: {message}")]
    Api { status: u16, message: String },
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    retry_after.map_or_else(String::new, |d| format!(", retry after {}s", d.as_secs()))
}

impl GraphError {
    /// Whether the error means the credentials themselves are unusable.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
