//! End-to-end runs: fetch snapshots, diff, apply.
//!
//! Both workflows take the graph by reference and report progress through a
//! caller-supplied event sink. Only failing to identify the authenticated
//! account is fatal; a missing target or a failing page degrades to a smaller
//! snapshot and the run continues.

use tracing::{info, instrument, warn};

use crate::diff::{plan_follow_back, plan_mirror};
use crate::execute::apply;
use crate::report::SnapshotSummary;
use crate::{
    ActionOutcome, ApplyOptions, Collected, GraphError, GraphResult, Mode, Relation, SocialGraph,
    SyncPlan, SyncReport, Tally, UserId,
};

/// Progress notifications emitted while a workflow runs.
#[derive(Debug, Clone, Copy)]
pub enum SyncEvent<'a> {
    /// A username resolved to an ID.
    Resolved { username: &'a str, user: &'a UserId },
    /// A username could not be resolved; its listings are treated as empty.
    LookupFailed {
        username: &'a str,
        error: &'a GraphError,
    },
    /// A listing is about to be fetched.
    Fetching { relation: Relation, user: &'a UserId },
    /// A listing finished, possibly partially.
    Fetched {
        relation: Relation,
        user: &'a UserId,
        collected: &'a Collected,
    },
    /// Unfollows were dropped because the target listing was incomplete.
    UnfollowsWithheld { count: usize },
    /// The plan about to be applied.
    Planned { plan: &'a SyncPlan },
    /// One action finished.
    Outcome(&'a ActionOutcome),
}

/// Options for [`mirror`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorOptions {
    pub apply: ApplyOptions,
    /// Unfollow even when the target's follower listing stopped early.
    pub allow_partial_unfollow: bool,
}

/// Follow exactly the followers of `target`.
///
/// Unfollows every account the caller follows that does not follow `target`,
/// then follows every follower of `target` the caller does not yet follow.
#[instrument(skip(graph, on_event))]
pub async fn mirror<G, F>(
    graph: &G,
    target: &str,
    options: MirrorOptions,
    mut on_event: F,
) -> GraphResult<SyncReport>
where
    G: SocialGraph + ?Sized,
    F: FnMut(SyncEvent<'_>),
{
    let me = graph.me().await?;
    let mut snapshots = Vec::with_capacity(2);

    let account = resolve(graph, target, &mut on_event).await;
    let target_followers = match &account {
        Some(user) => fetch(graph, Relation::Followers, user, &mut snapshots, &mut on_event).await,
        None => Collected::default(),
    };
    let current = fetch(graph, Relation::Following, &me, &mut snapshots, &mut on_event).await;

    let mut plan = plan_mirror(&current.ids, &target_followers.ids).excluding(&me);

    let mut withheld_unfollows = 0;
    let target_complete = account.is_some() && target_followers.is_complete();
    if !target_complete && !options.allow_partial_unfollow && !plan.to_unfollow.is_empty() {
        withheld_unfollows = plan.to_unfollow.len();
        warn!(
            count = withheld_unfollows,
            "Target follower listing incomplete, withholding unfollows"
        );
        plan.to_unfollow.clear();
        on_event(SyncEvent::UnfollowsWithheld {
            count: withheld_unfollows,
        });
    }

    let report = finish(
        graph,
        Mode::Mirror,
        me,
        account,
        snapshots,
        plan,
        withheld_unfollows,
        options.apply,
        &mut on_event,
    )
    .await;
    Ok(report)
}

/// Follow back every follower of `username` (or of the caller when `None`)
/// that the account does not already follow. Never unfollows.
#[instrument(skip(graph, on_event))]
pub async fn follow_back<G, F>(
    graph: &G,
    username: Option<&str>,
    options: ApplyOptions,
    mut on_event: F,
) -> GraphResult<SyncReport>
where
    G: SocialGraph + ?Sized,
    F: FnMut(SyncEvent<'_>),
{
    let me = graph.me().await?;
    let mut snapshots = Vec::with_capacity(2);

    let account = match username {
        Some(name) => resolve(graph, name, &mut on_event).await,
        None => Some(me.clone()),
    };

    let plan = match &account {
        Some(user) => {
            let followers =
                fetch(graph, Relation::Followers, user, &mut snapshots, &mut on_event).await;
            let following =
                fetch(graph, Relation::Following, user, &mut snapshots, &mut on_event).await;
            plan_follow_back(&followers.ids, &following.ids).excluding(&me)
        }
        None => SyncPlan::default(),
    };

    let report = finish(
        graph,
        Mode::FollowBack,
        me,
        account,
        snapshots,
        plan,
        0,
        options,
        &mut on_event,
    )
    .await;
    Ok(report)
}

async fn resolve<G, F>(graph: &G, username: &str, on_event: &mut F) -> Option<UserId>
where
    G: SocialGraph + ?Sized,
    F: FnMut(SyncEvent<'_>),
{
    match graph.lookup(username).await {
        Ok(user) => {
            info!(username, %user, "Resolved user");
            on_event(SyncEvent::Resolved {
                username,
                user: &user,
            });
            Some(user)
        }
        Err(error) => {
            warn!(username, error = %error, "Could not resolve user, treating as empty");
            on_event(SyncEvent::LookupFailed {
                username,
                error: &error,
            });
            None
        }
    }
}

async fn fetch<G, F>(
    graph: &G,
    relation: Relation,
    user: &UserId,
    snapshots: &mut Vec<SnapshotSummary>,
    on_event: &mut F,
) -> Collected
where
    G: SocialGraph + ?Sized,
    F: FnMut(SyncEvent<'_>),
{
    on_event(SyncEvent::Fetching { relation, user });
    let collected = graph.list(relation, user).await;

    if let Some(error) = &collected.error {
        warn!(%relation, %user, collected = collected.ids.len(), error = %error, "Listing incomplete");
    } else {
        info!(%relation, %user, count = collected.ids.len(), pages = collected.pages, "Listing fetched");
    }

    on_event(SyncEvent::Fetched {
        relation,
        user,
        collected: &collected,
    });
    snapshots.push(SnapshotSummary::new(relation, user, &collected));
    collected
}

#[allow(clippy::too_many_arguments)]
async fn finish<G, F>(
    graph: &G,
    mode: Mode,
    me: UserId,
    account: Option<UserId>,
    snapshots: Vec<SnapshotSummary>,
    plan: SyncPlan,
    withheld_unfollows: usize,
    options: ApplyOptions,
    on_event: &mut F,
) -> SyncReport
where
    G: SocialGraph + ?Sized,
    F: FnMut(SyncEvent<'_>),
{
    on_event(SyncEvent::Planned { plan: &plan });
    info!(
        follows = plan.to_follow.len(),
        unfollows = plan.to_unfollow.len(),
        dry_run = options.dry_run,
        "Applying plan"
    );

    let outcomes = apply(graph, &plan, options, |outcome| {
        on_event(SyncEvent::Outcome(outcome));
    })
    .await;

    SyncReport {
        mode,
        me,
        account,
        snapshots,
        planned_follows: plan.to_follow.len(),
        planned_unfollows: plan.to_unfollow.len(),
        withheld_unfollows,
        dry_run: options.dry_run,
        tally: Tally::from_outcomes(&outcomes),
        outcomes,
    }
}
