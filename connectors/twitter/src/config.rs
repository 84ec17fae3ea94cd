//! Twitter client configuration and credential file loading.
//!
//! The credential file is JSON:
//!
//! ```json
//! {
//!   "api_key": "...",
//!   "api_secret": "...",
//!   "access_token": "...",
//!   "access_token_secret": "...",
//!   "bearer_token": "..."
//! }
//! ```
//!
//! Every other key is optional and falls back to the defaults below.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use followsync_ratelimit::{PacerConfig, RequestBudget};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Credential file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Configuration for the Twitter client.
#[derive(Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    /// OAuth 1.0a Consumer Key (API Key)
    #[serde(alias = "consumer_key")]
    pub api_key: String,

    /// OAuth 1.0a Consumer Secret (API Secret)
    #[serde(alias = "consumer_secret")]
    pub api_secret: String,

    /// OAuth 1.0a Access Token
    pub access_token: String,

    /// OAuth 1.0a Access Token Secret
    pub access_token_secret: String,

    /// OAuth 2.0 Bearer Token, used for app-only v2 reads when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,

    /// Base URL for the API (default: https://api.twitter.com)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Request pacing
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Account whose followers `follow-back` reciprocates when none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_back_target: Option<String>,
}

fn default_api_url() -> String {
    "https://api.twitter.com".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl TwitterConfig {
    /// Load the credential file at `path`.
    ///
    /// A missing file is reported as [`ConfigError::Missing`]; malformed JSON
    /// or a missing required key is reported as [`ConfigError::Parse`] with
    /// the parser's error intact.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl fmt::Debug for TwitterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const REDACTED: &str = "<redacted>";
        f.debug_struct("TwitterConfig")
            .field("api_key", &REDACTED)
            .field("api_secret", &REDACTED)
            .field("access_token", &REDACTED)
            .field("access_token_secret", &REDACTED)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| REDACTED))
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("pacing", &self.pacing)
            .field("follow_back_target", &self.follow_back_target)
            .finish()
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay between retries in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Jitter factor (0.0-1.0)
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_jitter() -> f64 {
    0.1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: default_jitter(),
        }
    }
}

/// Request pacing for listings and relationship changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Minimum gap between two listing pages in milliseconds
    #[serde(default = "default_page_interval_ms")]
    pub page_interval_ms: u64,

    /// Minimum gap between two follow/unfollow calls in milliseconds
    #[serde(default = "default_action_interval_ms")]
    pub action_interval_ms: u64,

    /// Listing requests allowed per window
    #[serde(default = "default_read_requests")]
    pub read_requests_per_window: u32,

    /// Follow/unfollow requests allowed per window
    #[serde(default = "default_write_requests")]
    pub write_requests_per_window: u32,

    /// Rate limit window in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Longest a single request may wait for budget, in seconds
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

fn default_page_interval_ms() -> u64 {
    1000
}

fn default_action_interval_ms() -> u64 {
    2000
}

fn default_read_requests() -> u32 {
    RequestBudget::twitter_reads().requests
}

fn default_write_requests() -> u32 {
    RequestBudget::twitter_writes().requests
}

fn default_window_secs() -> u64 {
    15 * 60
}

fn default_max_wait_secs() -> u64 {
    15 * 60
}

impl PacingConfig {
    /// Pacer settings for paginated listings.
    #[must_use]
    pub fn reads(&self) -> PacerConfig {
        PacerConfig::new(
            RequestBudget::new(
                self.read_requests_per_window,
                Duration::from_secs(self.window_secs),
            ),
            Duration::from_millis(self.page_interval_ms),
            Duration::from_secs(self.max_wait_secs),
        )
    }

    /// Pacer settings for follow/unfollow calls.
    #[must_use]
    pub fn writes(&self) -> PacerConfig {
        PacerConfig::new(
            RequestBudget::new(
                self.write_requests_per_window,
                Duration::from_secs(self.window_secs),
            ),
            Duration::from_millis(self.action_interval_ms),
            Duration::from_secs(self.max_wait_secs),
        )
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_interval_ms: default_page_interval_ms(),
            action_interval_ms: default_action_interval_ms(),
            read_requests_per_window: default_read_requests(),
            write_requests_per_window: default_write_requests(),
            window_secs: default_window_secs(),
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            access_token: String::new(),
            access_token_secret: String::new(),
            bearer_token: None,
            api_url: default_api_url(),
            timeout: default_timeout(),
            retry: RetryConfig::default(),
            pacing: PacingConfig::default(),
            follow_back_target: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_minimal_credentials() {
        let file = write_config(
            r#"{
                "api_key": "key",
                "api_secret": "secret",
                "access_token": "token",
                "access_token_secret": "token_secret"
            }"#,
        );

        let config = TwitterConfig::load(file.path()).unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.access_token_secret, "token_secret");
        assert!(config.bearer_token.is_none());
        assert_eq!(config.api_url, "https://api.twitter.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.pacing.page_interval_ms, 1000);
        assert_eq!(config.pacing.action_interval_ms, 2000);
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"{
                "consumer_key": "key",
                "consumer_secret": "secret",
                "access_token": "token",
                "access_token_secret": "token_secret",
                "bearer_token": "bearer",
                "api_url": "http://localhost:8080",
                "timeout": 5,
                "retry": { "max_attempts": 1 },
                "pacing": { "page_interval_ms": 0, "write_requests_per_window": 300 },
                "follow_back_target": "someone"
            }"#,
        );

        let config = TwitterConfig::load(file.path()).unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.bearer_token.as_deref(), Some("bearer"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.retry.initial_delay_ms, 1000);
        assert_eq!(config.pacing.page_interval_ms, 0);
        assert_eq!(config.pacing.write_requests_per_window, 300);
        assert_eq!(config.pacing.read_requests_per_window, 15);
        assert_eq!(config.follow_back_target.as_deref(), Some("someone"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TwitterConfig::load(dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn test_missing_key_is_a_parse_error() {
        let file = write_config(r#"{ "api_key": "key", "api_secret": "secret" }"#);
        let err = TwitterConfig::load(file.path()).unwrap_err();

        match err {
            ConfigError::Parse { source, .. } => {
                assert!(source.to_string().contains("missing field `access_token`"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json() {
        let file = write_config("{ not json");
        let err = TwitterConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = TwitterConfig {
            api_key: "visible-key".into(),
            api_secret: "visible-secret".into(),
            bearer_token: Some("visible-bearer".into()),
            ..Default::default()
        };

        let debug = format!("{config:?}");
        assert!(!debug.contains("visible"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_pacer_configs() {
        let pacing = PacingConfig::default();
        let reads = pacing.reads();
        assert_eq!(reads.budget.requests, 15);
        assert_eq!(reads.min_interval, Duration::from_secs(1));

        let writes = pacing.writes();
        assert_eq!(writes.budget.requests, 50);
        assert_eq!(writes.min_interval, Duration::from_secs(2));
    }
}
