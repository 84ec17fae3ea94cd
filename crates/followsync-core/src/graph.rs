//! The social graph seam platform clients implement.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::{GraphError, GraphResult, IdSet, UserId};

/// Which side of a follow relationship is being listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Accounts following the user.
    Followers,
    /// Accounts the user follows.
    Following,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Followers => f.write_str("followers"),
            Self::Following => f.write_str("following"),
        }
    }
}

/// IDs gathered by walking every page of a listing.
///
/// When a page fails, `ids` holds what was collected before the failure and
/// `error` says why the walk stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    /// IDs collected.
    pub ids: IdSet,
    /// Pages successfully fetched.
    pub pages: u32,
    /// Failure that ended pagination early.
    pub error: Option<GraphError>,
}

impl Collected {
    /// A complete listing.
    #[must_use]
    pub const fn complete(ids: IdSet, pages: u32) -> Self {
        Self {
            ids,
            pages,
            error: None,
        }
    }

    /// Whether every page was fetched.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Follow-graph operations against one authenticated account.
///
/// Listing methods hide pagination and never fail outright: a failing page
/// yields a partial [`Collected`]. Mutations act on behalf of the
/// authenticated account and report failure per call.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// ID of the account the credentials act for.
    async fn me(&self) -> GraphResult<UserId>;

    /// Resolve a username (with or without a leading `@`) to an ID.
    async fn lookup(&self, username: &str) -> GraphResult<UserId>;

    /// Every account following `user`.
    async fn followers(&self, user: &UserId) -> Collected;

    /// Every account `user` follows.
    async fn following(&self, user: &UserId) -> Collected;

    /// Follow `user`.
    async fn follow(&self, user: &UserId) -> GraphResult<()>;

    /// Unfollow `user`.
    async fn unfollow(&self, user: &UserId) -> GraphResult<()>;

    /// List one side of `user`'s relationships.
    async fn list(&self, relation: Relation, user: &UserId) -> Collected {
        match relation {
            Relation::Followers => self.followers(user).await,
            Relation::Following => self.following(user).await,
        }
    }
}
