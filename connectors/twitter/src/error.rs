//! Twitter-specific error types.

use std::path::PathBuf;
use std::time::Duration;

use followsync_core::GraphError;
use thiserror::Error;

/// Legacy API error codes that mean "no such user or relationship".
const NOT_FOUND_CODES: &[i32] = &[17, 34, 50, 108];

/// Legacy API error codes for suspended or locked accounts.
const FORBIDDEN_CODES: &[i32] = &[63, 64, 160, 161, 162];

/// Twitter-specific errors.
#[derive(Error, Debug)]
pub enum TwitterError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// OAuth signature generation failed
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Twitter API returned an error
    #[error("Twitter API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        error_code: Option<i32>,
        retry_after: Option<u64>,
    },

    /// The API answered successfully but the requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited
    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TwitterError {
    /// Check if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::RateLimited { .. } => true,
            _ => false,
        }
    }

    /// Get the suggested retry delay.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(Duration::from_secs(*retry_after)),
            Self::Api { retry_after, .. } => retry_after.map(Duration::from_secs),
            _ => None,
        }
    }

    /// Convert to the platform-neutral graph error.
    #[must_use]
    pub fn to_graph_error(&self) -> GraphError {
        match self {
            Self::Http(e) => GraphError::Transport(e.to_string()),
            Self::Json(e) => GraphError::Transport(format!("unexpected response body: {e}")),
            Self::OAuth(msg) => GraphError::Unauthorized(format!("OAuth error: {msg}")),
            Self::Api {
                status,
                message,
                error_code,
                retry_after,
            } => {
                let code = error_code.unwrap_or_default();
                if *status == 429 || code == 88 {
                    GraphError::RateLimited {
                        retry_after: retry_after.map(Duration::from_secs),
                    }
                } else if *status == 401 || code == 32 || code == 89 {
                    GraphError::Unauthorized(message.clone())
                } else if *status == 404 || NOT_FOUND_CODES.contains(&code) {
                    GraphError::NotFound(message.clone())
                } else if *status == 403 || FORBIDDEN_CODES.contains(&code) {
                    GraphError::Forbidden(message.clone())
                } else {
                    GraphError::Api {
                        status: *status,
                        message: message.clone(),
                    }
                }
            }
            Self::NotFound(msg) => GraphError::NotFound(msg.clone()),
            Self::RateLimited { retry_after } => GraphError::RateLimited {
                retry_after: Some(Duration::from_secs(*retry_after)),
            },
            Self::Config(msg) => GraphError::Transport(format!("configuration error: {msg}")),
        }
    }
}

impl From<TwitterError> for GraphError {
    fn from(err: TwitterError) -> Self {
        err.to_graph_error()
    }
}

/// Result type for Twitter operations.
pub type TwitterResult<T> = Result<T, TwitterError>;

/// Failure to load the credential file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file does not exist.
    #[error("config file {} not found", .path.display())]
    Missing { path: PathBuf },

    /// The file exists but could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON or lacks a required key.
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, code: Option<i32>) -> TwitterError {
        TwitterError::Api {
            status,
            message: "boom".into(),
            error_code: code,
            retry_after: Some(30),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(api(401, None).to_graph_error(), GraphError::Unauthorized(_)));
        assert!(matches!(api(403, None).to_graph_error(), GraphError::Forbidden(_)));
        assert!(matches!(api(404, None).to_graph_error(), GraphError::NotFound(_)));
        assert!(matches!(api(500, None).to_graph_error(), GraphError::Api { status: 500, .. }));
        assert_eq!(
            api(429, None).to_graph_error(),
            GraphError::RateLimited {
                retry_after: Some(Duration::from_secs(30))
            }
        );
    }

    #[test]
    fn test_legacy_code_mapping() {
        // Legacy API reports unknown users as 404/code 50 and bad pages as 404/code 34,
        // but some endpoints answer 403 with a not-found code.
        assert!(matches!(api(403, Some(50)).to_graph_error(), GraphError::NotFound(_)));
        assert!(matches!(api(403, Some(63)).to_graph_error(), GraphError::Forbidden(_)));
        assert!(matches!(api(400, Some(88)).to_graph_error(), GraphError::RateLimited { .. }));
        assert!(matches!(api(400, Some(32)).to_graph_error(), GraphError::Unauthorized(_)));
    }

    #[test]
    fn test_retryable() {
        assert!(api(503, None).is_retryable());
        assert!(api(429, None).is_retryable());
        assert!(!api(404, None).is_retryable());
        assert!(TwitterError::RateLimited { retry_after: 1 }.is_retryable());
        assert!(!TwitterError::NotFound("x".into()).is_retryable());
    }
}
