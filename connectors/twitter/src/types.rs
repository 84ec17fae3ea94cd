//! Twitter API wire types, for both the v2 and the legacy v1.1 surface.

use followsync_core::UserId;
use serde::{Deserialize, Serialize};

use crate::error::TwitterError;

// ─────────────────────────────────────────────────────────────────────────────
// v2 Response Wrapper
// ─────────────────────────────────────────────────────────────────────────────

/// Standard Twitter API v2 response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterResponse<T> {
    /// The primary data
    pub data: Option<T>,

    /// Metadata about the response
    pub meta: Option<ResponseMeta>,

    /// Errors (partial failures)
    pub errors: Option<Vec<TwitterApiError>>,
}

impl<T> TwitterResponse<T> {
    /// Token for the next page, if there is one.
    #[must_use]
    pub fn next_token(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.next_token.as_deref())
            .filter(|token| !token.is_empty())
    }

    /// The failure a response reports when it carries errors and no data.
    ///
    /// v2 answers `200 OK` with only an `errors` array when, for example, the
    /// account is protected or suspended.
    #[must_use]
    pub fn embedded_error(&self) -> Option<TwitterError> {
        if self.data.is_some() {
            return None;
        }
        let error = self.errors.as_ref()?.first()?;
        let message = error.describe();
        let kind = error.error_type.as_deref().unwrap_or_default();

        Some(if kind.ends_with("resource-not-found") {
            TwitterError::NotFound(message)
        } else {
            let status = if kind.ends_with("not-authorized-for-resource")
                || error.title.as_deref() == Some("Authorization Error")
            {
                403
            } else {
                200
            };
            TwitterError::Api {
                status,
                message,
                error_code: None,
                retry_after: None,
            }
        })
    }

    /// Human-readable summary of the first reported error.
    #[must_use]
    pub fn first_error(&self) -> Option<String> {
        self.errors
            .as_ref()
            .and_then(|errors| errors.first())
            .map(TwitterApiError::describe)
    }
}

/// Response metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Number of results
    #[serde(default)]
    pub result_count: Option<u32>,

    /// Token for next page
    #[serde(default)]
    pub next_token: Option<String>,

    /// Token for previous page
    #[serde(default)]
    pub previous_token: Option<String>,
}

/// Twitter API error object, as reported inside a v2 response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterApiError {
    /// Error title
    #[serde(default)]
    pub title: Option<String>,

    /// Error detail
    #[serde(default)]
    pub detail: Option<String>,

    /// Error type
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,

    /// Resource type (e.g., "user")
    #[serde(default)]
    pub resource_type: Option<String>,

    /// Resource ID that caused the error
    #[serde(default)]
    pub resource_id: Option<String>,

    /// Parameter that caused the error
    #[serde(default)]
    pub parameter: Option<String>,

    /// Offending value
    #[serde(default)]
    pub value: Option<String>,
}

impl TwitterApiError {
    fn describe(&self) -> String {
        self.detail
            .clone()
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| "unknown error".into())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// v2 Users and Follows
// ─────────────────────────────────────────────────────────────────────────────

/// Twitter user object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Username (handle without @)
    pub username: String,

    /// Whether the account's follows require approval
    #[serde(default)]
    pub protected: Option<bool>,
}

/// Body of `POST /2/users/:id/following`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowRequest {
    /// Account to follow
    pub target_user_id: String,
}

/// Relationship state returned by follow and unfollow calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FollowingStatus {
    /// Whether the source account now follows the target
    #[serde(default)]
    pub following: bool,

    /// Whether a follow request awaits approval (protected targets)
    #[serde(default)]
    pub pending_follow: Option<bool>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Legacy v1.1
// ─────────────────────────────────────────────────────────────────────────────

/// One page of `friends/ids` or `followers/ids`.
#[derive(Debug, Clone, Deserialize)]
pub struct IdPage {
    /// IDs on this page
    #[serde(default)]
    pub ids: Vec<RawId>,

    /// Cursor for the next page; `"0"` once exhausted
    #[serde(default = "exhausted_cursor")]
    pub next_cursor_str: String,
}

fn exhausted_cursor() -> String {
    "0".into()
}

impl IdPage {
    /// Cursor for the next page, if there is one.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        match self.next_cursor_str.as_str() {
            "0" | "" => None,
            cursor => Some(cursor),
        }
    }

    /// IDs on this page.
    pub fn user_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.ids.iter().map(RawId::to_user_id)
    }
}

/// A legacy ID, sent as a string with `stringify_ids=true` and as a number
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// `stringify_ids=true` form.
    Text(String),
    /// Plain JSON number.
    Number(u64),
}

impl RawId {
    /// Convert into a [`UserId`].
    #[must_use]
    pub fn to_user_id(&self) -> UserId {
        match self {
            Self::Text(id) => UserId::from(id.as_str()),
            Self::Number(id) => UserId::from(*id),
        }
    }
}

/// Legacy user object; only the fields the follow graph needs.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyUser {
    /// User ID as a string
    pub id_str: String,

    /// Handle without @
    #[serde(default)]
    pub screen_name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Error Bodies
// ─────────────────────────────────────────────────────────────────────────────

/// Error body of a non-2xx response.
///
/// v2 answers with problem details (`title`, `detail`), the legacy surface
/// with `{"errors": [{"code": .., "message": ..}]}`; both are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Problem title
    #[serde(default)]
    pub title: Option<String>,

    /// Problem detail
    #[serde(default)]
    pub detail: Option<String>,

    /// Error list
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

/// One entry of an error list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorItem {
    /// Legacy numeric error code
    #[serde(default)]
    pub code: Option<i32>,

    /// Legacy message
    #[serde(default)]
    pub message: Option<String>,

    /// v2 detail
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Best available error message.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.detail
            .clone()
            .or_else(|| {
                self.errors
                    .iter()
                    .find_map(|e| e.message.clone().or_else(|| e.detail.clone()))
            })
            .or_else(|| self.title.clone())
    }

    /// First legacy error code.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        self.errors.iter().find_map(|e| e.code)
    }
}
