//! Twitter REST API client.

use std::time::Duration;

use followsync_ratelimit::{ExponentialBackoff, Pacer, RateLimitHeaders};
use reqwest::{header::HeaderMap, Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument, warn};

use crate::{
    config::{RetryConfig, TwitterConfig},
    error::{TwitterError, TwitterResult},
    oauth::{percent_encode, OAuthSigner},
    types::{ErrorBody, FollowRequest, FollowingStatus, IdPage, LegacyUser, TwitterResponse, User},
};

/// Page size for legacy ID listings (the endpoint maximum).
const LEGACY_PAGE_SIZE: u32 = 5000;

/// Page size for v2 follower/following listings (the endpoint maximum).
const V2_PAGE_SIZE: u32 = 1000;

/// Fallback wait when a 429 arrives without a usable reset header.
const DEFAULT_RATE_LIMIT_WAIT_SECS: u64 = 60;

/// How a request is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    /// OAuth 1.0a user context.
    User,
    /// App-only bearer token when configured, user context otherwise.
    AppPreferred,
}

/// Which pacer a request is charged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Budget {
    /// Single lookups; not paced.
    Lookup,
    /// Listing pages.
    Read,
    /// Follow and unfollow calls.
    Write,
}

/// Twitter REST API client.
#[derive(Debug)]
pub struct TwitterApiClient {
    client: Client,
    base_url: String,
    oauth_signer: OAuthSigner,
    bearer_token: Option<String>,
    retry: RetryConfig,
    reads: Pacer,
    writes: Pacer,
    /// Longest the client sleeps before a retry.
    max_wait: Duration,
}

impl TwitterApiClient {
    /// Create a new API client from configuration.
    pub fn new(config: &TwitterConfig) -> TwitterResult<Self> {
        let reads = config.pacing.reads();
        let writes = config.pacing.writes();
        for pacer in [&reads, &writes] {
            pacer
                .budget
                .validate()
                .map_err(|e| TwitterError::Config(e.to_string()))?;
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("followsync/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            oauth_signer: OAuthSigner::new(config),
            bearer_token: config
                .bearer_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
            retry: config.retry.clone(),
            max_wait: reads.max_wait,
            reads: Pacer::new(reads),
            writes: Pacer::new(writes),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Legacy v1.1 endpoints
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify the credentials and return the authenticated user.
    #[instrument(skip(self))]
    pub async fn verify_credentials(&self) -> TwitterResult<LegacyUser> {
        let params = params(&[("include_entities", "false"), ("skip_status", "true")]);
        self.send(
            Method::GET,
            "/1.1/account/verify_credentials.json",
            &params,
            None::<&()>,
            Auth::User,
            Budget::Lookup,
        )
        .await
    }

    /// Look up a user by screen name.
    #[instrument(skip(self))]
    pub async fn show_user(&self, screen_name: &str) -> TwitterResult<LegacyUser> {
        let params = params(&[("screen_name", screen_name), ("include_entities", "false")]);
        self.send(
            Method::GET,
            "/1.1/users/show.json",
            &params,
            None::<&()>,
            Auth::User,
            Budget::Lookup,
        )
        .await
    }

    /// One page of the accounts `user_id` follows. The first cursor is `-1`.
    #[instrument(skip(self))]
    pub async fn friend_ids(&self, user_id: &str, cursor: &str) -> TwitterResult<IdPage> {
        self.id_page("/1.1/friends/ids.json", user_id, cursor).await
    }

    /// One page of the accounts following `user_id`. The first cursor is `-1`.
    #[instrument(skip(self))]
    pub async fn follower_ids(&self, user_id: &str, cursor: &str) -> TwitterResult<IdPage> {
        self.id_page("/1.1/followers/ids.json", user_id, cursor).await
    }

    /// Follow `user_id`.
    #[instrument(skip(self))]
    pub async fn create_friendship(&self, user_id: &str) -> TwitterResult<LegacyUser> {
        let params = params(&[("user_id", user_id)]);
        self.send(
            Method::POST,
            "/1.1/friendships/create.json",
            &params,
            None::<&()>,
            Auth::User,
            Budget::Write,
        )
        .await
    }

    /// Unfollow `user_id`.
    #[instrument(skip(self))]
    pub async fn destroy_friendship(&self, user_id: &str) -> TwitterResult<LegacyUser> {
        let params = params(&[("user_id", user_id)]);
        self.send(
            Method::POST,
            "/1.1/friendships/destroy.json",
            &params,
            None::<&()>,
            Auth::User,
            Budget::Write,
        )
        .await
    }

    async fn id_page(&self, endpoint: &str, user_id: &str, cursor: &str) -> TwitterResult<IdPage> {
        let count = LEGACY_PAGE_SIZE.to_string();
        let params = params(&[
            ("user_id", user_id),
            ("cursor", cursor),
            ("count", count.as_str()),
            ("stringify_ids", "true"),
        ]);
        self.send(
            Method::GET,
            endpoint,
            &params,
            None::<&()>,
            Auth::User,
            Budget::Read,
        )
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // v2 endpoints
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the authenticated user.
    #[instrument(skip(self))]
    pub async fn get_me(&self) -> TwitterResult<TwitterResponse<User>> {
        let params = params(&[("user.fields", "id,name,username,protected")]);
        self.send(
            Method::GET,
            "/2/users/me",
            &params,
            None::<&()>,
            Auth::User,
            Budget::Lookup,
        )
        .await
    }

    /// Get a user by username.
    #[instrument(skip(self))]
    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> TwitterResult<TwitterResponse<User>> {
        let params = params(&[("user.fields", "id,name,username,protected")]);
        self.send(
            Method::GET,
            &format!("/2/users/by/username/{}", percent_encode(username)),
            &params,
            None::<&()>,
            Auth::AppPreferred,
            Budget::Lookup,
        )
        .await
    }

    /// One page of the accounts following `user_id`.
    #[instrument(skip(self))]
    pub async fn get_followers(
        &self,
        user_id: &str,
        pagination_token: Option<&str>,
    ) -> TwitterResult<TwitterResponse<Vec<User>>> {
        self.user_page("followers", user_id, pagination_token).await
    }

    /// One page of the accounts `user_id` follows.
    #[instrument(skip(self))]
    pub async fn get_following(
        &self,
        user_id: &str,
        pagination_token: Option<&str>,
    ) -> TwitterResult<TwitterResponse<Vec<User>>> {
        self.user_page("following", user_id, pagination_token).await
    }

    /// Make `source_id` follow `target_id`.
    #[instrument(skip(self))]
    pub async fn follow_user(
        &self,
        source_id: &str,
        target_id: &str,
    ) -> TwitterResult<TwitterResponse<FollowingStatus>> {
        let body = FollowRequest {
            target_user_id: target_id.to_string(),
        };
        self.send(
            Method::POST,
            &format!("/2/users/{}/following", percent_encode(source_id)),
            &[],
            Some(&body),
            Auth::User,
            Budget::Write,
        )
        .await
    }

    /// Make `source_id` unfollow `target_id`.
    #[instrument(skip(self))]
    pub async fn unfollow_user(
        &self,
        source_id: &str,
        target_id: &str,
    ) -> TwitterResult<TwitterResponse<FollowingStatus>> {
        self.send(
            Method::DELETE,
            &format!(
                "/2/users/{}/following/{}",
                percent_encode(source_id),
                percent_encode(target_id)
            ),
            &[],
            None::<&()>,
            Auth::User,
            Budget::Write,
        )
        .await
    }

    async fn user_page(
        &self,
        relation: &str,
        user_id: &str,
        pagination_token: Option<&str>,
    ) -> TwitterResult<TwitterResponse<Vec<User>>> {
        let max_results = V2_PAGE_SIZE.to_string();
        let mut params = params(&[
            ("max_results", max_results.as_str()),
            ("user.fields", "id,username"),
        ]);
        if let Some(token) = pagination_token {
            params.push(("pagination_token".to_string(), token.to_string()));
        }

        self.send(
            Method::GET,
            &format!("/2/users/{}/{relation}", percent_encode(user_id)),
            &params,
            None::<&()>,
            Auth::AppPreferred,
            Budget::Read,
        )
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request core
    // ─────────────────────────────────────────────────────────────────────────

    fn pacer(&self, budget: Budget) -> Option<&Pacer> {
        match budget {
            Budget::Lookup => None,
            Budget::Read => Some(&self.reads),
            Budget::Write => Some(&self.writes),
        }
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(String, String)],
        body: Option<&B>,
        auth: Auth,
        budget: Budget,
    ) -> TwitterResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let full_url = if params.is_empty() {
            url.clone()
        } else {
            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            format!("{url}?{query}")
        };

        let pacer = self.pacer(budget);
        let max_attempts = self.retry.max_attempts.max(1);
        let backoff = ExponentialBackoff::new(
            Duration::from_millis(self.retry.initial_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms),
        )
        .with_jitter(self.retry.jitter);
        let mut attempts = 0;

        loop {
            attempts += 1;

            if let Some(pacer) = pacer {
                pacer
                    .ready()
                    .await
                    .map_err(|e| TwitterError::RateLimited {
                        retry_after: e.retry_after().map_or(0, |d| d.as_secs()),
                    })?;
            }

            debug!(
                attempt = attempts,
                %method, endpoint, "Making Twitter API request"
            );

            let mut req = self
                .client
                .request(method.clone(), &full_url)
                .header("Authorization", self.authorization(&method, &url, params, auth)?);
            if let Some(b) = body {
                req = req.json(b);
            }

            let result = match req.send().await {
                Ok(response) => self.handle_response(response, pacer).await,
                Err(e) => Err(TwitterError::Http(e)),
            };

            match result {
                Ok(data) => return Ok(data),
                Err(e) if e.is_retryable() && attempts < max_attempts => {
                    let delay = e
                        .retry_after()
                        .unwrap_or_else(|| backoff.delay(attempts - 1));
                    if delay > self.max_wait {
                        warn!(
                            delay_secs = delay.as_secs(),
                            max_wait_secs = self.max_wait.as_secs(),
                            error = %e,
                            "Retry delay exceeds the wait limit, giving up"
                        );
                        return Err(e);
                    }
                    warn!(
                        attempt = attempts,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "Retrying Twitter API request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn authorization(
        &self,
        method: &Method,
        url: &str,
        params: &[(String, String)],
        auth: Auth,
    ) -> TwitterResult<String> {
        match (&self.bearer_token, auth) {
            (Some(bearer), Auth::AppPreferred) => Ok(format!("Bearer {bearer}")),
            _ => self.oauth_signer.sign(method.as_str(), url, params),
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        pacer: Option<&Pacer>,
    ) -> TwitterResult<T> {
        let status = response.status();

        let rate_limit = rate_limit_headers(response.headers());
        if let Some(pacer) = pacer {
            pacer.observe(&rate_limit);
        }
        if rate_limit.remaining == Some(0) {
            debug!(reset = ?rate_limit.reset_at, "Rate limit exhausted");
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = rate_limit
                .suggested_wait()
                .map_or(DEFAULT_RATE_LIMIT_WAIT_SECS, |d| d.as_secs());

            return Err(TwitterError::RateLimited { retry_after });
        }

        let bytes = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(TwitterError::from);
        }

        let error_body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
        let message = error_body.message().unwrap_or_else(|| {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                text
            }
        });

        Err(TwitterError::Api {
            status: status.as_u16(),
            message,
            error_code: error_body.code(),
            retry_after: rate_limit
                .is_limited()
                .then(|| rate_limit.suggested_wait())
                .flatten()
                .map(|d| d.as_secs()),
        })
    }
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn rate_limit_headers(headers: &HeaderMap) -> RateLimitHeaders {
    RateLimitHeaders::from_pairs(
        headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?))),
    )
}
