//! [`SocialGraph`] implementations over the legacy and v2 APIs.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use followsync_core::{Collected, GraphError, GraphResult, Relation, SocialGraph, UserId};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::client::TwitterApiClient;
use crate::error::{TwitterError, TwitterResult};

/// Longest username the platform allows.
const MAX_USERNAME_LEN: usize = 15;

/// API surface a graph talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiSurface {
    /// v1.1 cursor-paginated endpoints.
    Legacy,
    /// `/2/users/...` endpoints.
    V2,
}

impl ApiSurface {
    /// Build a graph on this surface over a shared client.
    #[must_use]
    pub fn graph(self, client: Arc<TwitterApiClient>) -> Box<dyn SocialGraph> {
        match self {
            Self::Legacy => Box::new(LegacyGraph::new(client)),
            Self::V2 => Box::new(GraphV2::new(client)),
        }
    }
}

impl fmt::Display for ApiSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

/// Strip a leading `@` and check the handle is well formed.
pub fn normalize_username(raw: &str) -> GraphResult<&str> {
    let name = raw.trim();
    let name = name.strip_prefix('@').unwrap_or(name);

    let valid = !name.is_empty()
        && name.len() <= MAX_USERNAME_LEN
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if valid {
        Ok(name)
    } else {
        Err(GraphError::NotFound(format!("invalid username {raw:?}")))
    }
}

/// Walk a cursor-paginated listing to the end.
///
/// `fetch` receives the cursor of the page to load (`None` for the first) and
/// returns the page's IDs plus the next cursor. A failing page ends the walk
/// with what was gathered so far.
async fn collect_pages<F, Fut>(relation: Relation, user: &UserId, mut fetch: F) -> Collected
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = TwitterResult<(Vec<UserId>, Option<String>)>>,
{
    let mut collected = Collected::default();
    let mut cursor: Option<String> = None;
    let mut seen = HashSet::new();

    loop {
        match fetch(cursor.take()).await {
            Ok((ids, next)) => {
                collected.pages += 1;
                debug!(
                    %relation,
                    user = %user,
                    page = collected.pages,
                    count = ids.len(),
                    "Fetched page"
                );
                collected.ids.extend(ids);

                match next {
                    Some(next) if seen.insert(next.clone()) => cursor = Some(next),
                    Some(next) => {
                        warn!(%relation, user = %user, cursor = %next, "Cursor repeated, stopping");
                        break;
                    }
                    None => break,
                }
            }
            Err(e) => {
                warn!(
                    %relation,
                    user = %user,
                    pages = collected.pages,
                    collected = collected.ids.len(),
                    error = %e,
                    "Listing page failed, keeping partial results"
                );
                collected.error = Some(e.into());
                break;
            }
        }
    }

    collected
}

// ─────────────────────────────────────────────────────────────────────────────
// Legacy v1.1
// ─────────────────────────────────────────────────────────────────────────────

/// Follow graph over the legacy v1.1 endpoints.
#[derive(Debug, Clone)]
pub struct LegacyGraph {
    client: Arc<TwitterApiClient>,
}

impl LegacyGraph {
    /// Create a graph over `client`.
    #[must_use]
    pub const fn new(client: Arc<TwitterApiClient>) -> Self {
        Self { client }
    }

    async fn ids(&self, relation: Relation, user: &UserId) -> Collected {
        let client = &self.client;
        collect_pages(relation, user, |cursor| async move {
            let cursor = cursor.unwrap_or_else(|| "-1".to_string());
            let page = match relation {
                Relation::Followers => client.follower_ids(user.as_str(), &cursor).await?,
                Relation::Following => client.friend_ids(user.as_str(), &cursor).await?,
            };
            let next = page.next_cursor().map(str::to_string);
            Ok::<_, TwitterError>((page.user_ids().collect::<Vec<_>>(), next))
        })
        .await
    }
}

#[async_trait]
impl SocialGraph for LegacyGraph {
    async fn me(&self) -> GraphResult<UserId> {
        let user = self.client.verify_credentials().await?;
        info!(id = %user.id_str, screen_name = %user.screen_name, "Authenticated");
        Ok(UserId::from(user.id_str))
    }

    async fn lookup(&self, username: &str) -> GraphResult<UserId> {
        let name = normalize_username(username)?;
        let user = self.client.show_user(name).await?;
        Ok(UserId::from(user.id_str))
    }

    async fn followers(&self, user: &UserId) -> Collected {
        self.ids(Relation::Followers, user).await
    }

    async fn following(&self, user: &UserId) -> Collected {
        self.ids(Relation::Following, user).await
    }

    async fn follow(&self, user: &UserId) -> GraphResult<()> {
        self.client.create_friendship(user.as_str()).await?;
        Ok(())
    }

    async fn unfollow(&self, user: &UserId) -> GraphResult<()> {
        self.client.destroy_friendship(user.as_str()).await?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// v2
// ─────────────────────────────────────────────────────────────────────────────

/// Follow graph over the v2 endpoints.
///
/// Follow and unfollow are addressed from the authenticated account, so its
/// ID is fetched once and cached.
#[derive(Debug)]
pub struct GraphV2 {
    client: Arc<TwitterApiClient>,
    me: OnceCell<UserId>,
}

impl GraphV2 {
    /// Create a graph over `client`.
    #[must_use]
    pub fn new(client: Arc<TwitterApiClient>) -> Self {
        Self {
            client,
            me: OnceCell::new(),
        }
    }

    async fn users(&self, relation: Relation, user: &UserId) -> Collected {
        let client = &self.client;
        collect_pages(relation, user, |token| async move {
            let token = token.as_deref();
            let page = match relation {
                Relation::Followers => client.get_followers(user.as_str(), token).await?,
                Relation::Following => client.get_following(user.as_str(), token).await?,
            };
            if let Some(error) = page.embedded_error() {
                return Err(error);
            }
            let next = page.next_token().map(str::to_string);
            let ids: Vec<UserId> = page
                .data
                .unwrap_or_default()
                .into_iter()
                .map(|u| UserId::from(u.id))
                .collect();
            Ok::<_, TwitterError>((ids, next))
        })
        .await
    }

    async fn fetch_me(&self) -> TwitterResult<UserId> {
        let response = self.client.get_me().await?;
        let detail = response.first_error();
        let user = response.data.ok_or_else(|| {
            TwitterError::NotFound(detail.unwrap_or_else(|| "authenticated user".into()))
        })?;
        info!(id = %user.id, username = %user.username, "Authenticated");
        Ok(UserId::from(user.id))
    }
}

#[async_trait]
impl SocialGraph for GraphV2 {
    async fn me(&self) -> GraphResult<UserId> {
        let me = self.me.get_or_try_init(|| self.fetch_me()).await?;
        Ok(me.clone())
    }

    async fn lookup(&self, username: &str) -> GraphResult<UserId> {
        let name = normalize_username(username)?;
        let response = self.client.get_user_by_username(name).await?;
        let detail = response.first_error();
        let user = response
            .data
            .ok_or_else(|| GraphError::NotFound(detail.unwrap_or_else(|| name.to_string())))?;
        Ok(UserId::from(user.id))
    }

    async fn followers(&self, user: &UserId) -> Collected {
        self.users(Relation::Followers, user).await
    }

    async fn following(&self, user: &UserId) -> Collected {
        self.users(Relation::Following, user).await
    }

    async fn follow(&self, user: &UserId) -> GraphResult<()> {
        let me = self.me().await?;
        let status = self
            .client
            .follow_user(me.as_str(), user.as_str())
            .await?
            .data
            .unwrap_or_default();
        if status.pending_follow == Some(true) {
            debug!(user = %user, "Follow request pending approval");
        }
        Ok(())
    }

    async fn unfollow(&self, user: &UserId) -> GraphResult<()> {
        let me = self.me().await?;
        self.client
            .unfollow_user(me.as_str(), user.as_str())
            .await?;
        Ok(())
    }
}
