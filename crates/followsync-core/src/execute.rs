//! Applies a [`SyncPlan`] one relationship at a time.
//!
//! Every planned action is attempted regardless of earlier failures; nothing
//! already done is rolled back.

use serde::Serialize;
use tracing::{debug, warn};

use crate::{SocialGraph, SyncPlan, UserId};

/// A relationship mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Follow,
    Unfollow,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Follow => f.write_str("follow"),
            Self::Unfollow => f.write_str("unfollow"),
        }
    }
}

/// How a single action ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ActionStatus {
    /// The platform accepted the change.
    Done,
    /// Not attempted (dry run).
    Skipped,
    /// The platform call failed.
    Failed(String),
}

/// Result of one attempted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub action: Action,
    pub user: UserId,
    #[serde(flatten)]
    pub status: ActionStatus,
}

/// Options for [`apply`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Record every action as skipped without calling the platform.
    pub dry_run: bool,
}

/// Run every action in `plan`: unfollows first, then follows.
///
/// `on_outcome` observes each outcome as soon as it is known.
pub async fn apply<G, F>(
    graph: &G,
    plan: &SyncPlan,
    options: ApplyOptions,
    mut on_outcome: F,
) -> Vec<ActionOutcome>
where
    G: SocialGraph + ?Sized,
    F: FnMut(&ActionOutcome),
{
    let queue = plan
        .to_unfollow
        .iter()
        .map(|user| (Action::Unfollow, user))
        .chain(plan.to_follow.iter().map(|user| (Action::Follow, user)));

    let mut outcomes = Vec::with_capacity(plan.len());
    for (action, user) in queue {
        let status = if options.dry_run {
            ActionStatus::Skipped
        } else {
            run_one(graph, action, user).await
        };

        let outcome = ActionOutcome {
            action,
            user: user.clone(),
            status,
        };
        on_outcome(&outcome);
        outcomes.push(outcome);
    }

    outcomes
}

async fn run_one<G>(graph: &G, action: Action, user: &UserId) -> ActionStatus
where
    G: SocialGraph + ?Sized,
{
    let result = match action {
        Action::Follow => graph.follow(user).await,
        Action::Unfollow => graph.unfollow(user).await,
    };

    match result {
        Ok(()) => {
            debug!(%action, %user, "Relationship updated");
            ActionStatus::Done
        }
        Err(e) => {
            warn!(%action, %user, error = %e, "Relationship update failed, continuing");
            ActionStatus::Failed(e.to_string())
        }
    }
}
