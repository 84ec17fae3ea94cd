//! Run summaries.

use serde::Serialize;

use crate::{Action, ActionOutcome, ActionStatus, Collected, Relation, UserId};

/// Which workflow produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Mirror,
    FollowBack,
}

/// Counts of action outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub followed: usize,
    pub unfollowed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    /// Count `outcomes`.
    #[must_use]
    pub fn from_outcomes(outcomes: &[ActionOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut tally, outcome| {
            match (&outcome.status, outcome.action) {
                (ActionStatus::Done, Action::Follow) => tally.followed += 1,
                (ActionStatus::Done, Action::Unfollow) => tally.unfollowed += 1,
                (ActionStatus::Skipped, _) => tally.skipped += 1,
                (ActionStatus::Failed(_), _) => tally.failed += 1,
            }
            tally
        })
    }
}

/// What one listing fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub relation: Relation,
    pub user: UserId,
    pub count: usize,
    pub pages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SnapshotSummary {
    pub(crate) fn new(relation: Relation, user: &UserId, collected: &Collected) -> Self {
        Self {
            relation,
            user: user.clone(),
            count: collected.ids.len(),
            pages: collected.pages,
            error: collected.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Outcome of a full workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub mode: Mode,
    /// Authenticated account the actions were performed as.
    pub me: UserId,
    /// Account whose graph drove the plan, when it could be resolved.
    pub account: Option<UserId>,
    pub snapshots: Vec<SnapshotSummary>,
    pub planned_follows: usize,
    pub planned_unfollows: usize,
    /// Unfollows dropped because the target listing was incomplete.
    pub withheld_unfollows: usize,
    pub dry_run: bool,
    pub outcomes: Vec<ActionOutcome>,
    pub tally: Tally,
}

impl SyncReport {
    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ActionStatus::Failed(_)))
    }

    /// Whether any listing stopped early.
    #[must_use]
    pub fn has_partial_snapshot(&self) -> bool {
        self.snapshots.iter().any(|s| s.error.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(action: Action, id: u64, status: ActionStatus) -> ActionOutcome {
        ActionOutcome {
            action,
            user: UserId::from(id),
            status,
        }
    }

    #[test]
    fn test_tally_counts_each_status() {
        let outcomes = vec![
            outcome(Action::Follow, 1, ActionStatus::Done),
            outcome(Action::Follow, 2, ActionStatus::Failed("nope".into())),
            outcome(Action::Unfollow, 3, ActionStatus::Done),
            outcome(Action::Unfollow, 4, ActionStatus::Skipped),
            outcome(Action::Follow, 5, ActionStatus::Done),
        ];

        let tally = Tally::from_outcomes(&outcomes);
        assert_eq!(
            tally,
            Tally {
                followed: 2,
                unfollowed: 1,
                skipped: 1,
                failed: 1,
            }
        );
    }
}
