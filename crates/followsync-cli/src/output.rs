//! Progress lines and the final report.

use anyhow::{Context, Result};
use followsync_core::{Action, ActionOutcome, ActionStatus, SyncEvent, SyncReport};

/// Prints workflow events as they happen, unless JSON output was asked for.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    quiet: bool,
}

impl Progress {
    pub const fn new(json: bool) -> Self {
        Self { quiet: json }
    }

    pub fn event(&mut self, event: SyncEvent<'_>) {
        if self.quiet {
            return;
        }

        match event {
            SyncEvent::Resolved { username, user } => println!("Resolved {username} to user {user}"),
            SyncEvent::LookupFailed { username, error } => {
                println!("Error looking up {username}: {error}");
            }
            SyncEvent::Fetching { relation, user } => println!("Fetching {relation} of {user}..."),
            SyncEvent::Fetched {
                relation,
                user,
                collected,
            } => match &collected.error {
                None => println!("Fetched {} {relation} of {user}", collected.ids.len()),
                Some(error) => println!(
                    "Fetched {} {relation} of {user} before page {} failed: {error}",
                    collected.ids.len(),
                    collected.pages + 1
                ),
            },
            SyncEvent::UnfollowsWithheld { count } => println!(
                "Skipping {count} unfollows because the target's follower list is incomplete \
                 (pass --allow-partial-unfollow to unfollow anyway)"
            ),
            SyncEvent::Planned { plan } => {
                println!("Unfollowing {} users...", plan.to_unfollow.len());
                println!("Following {} new users...", plan.to_follow.len());
            }
            SyncEvent::Outcome(outcome) => println!("{}", describe(outcome)),
        }
    }
}

fn describe(outcome: &ActionOutcome) -> String {
    let user = &outcome.user;
    match (&outcome.status, outcome.action) {
        (ActionStatus::Done, Action::Follow) => format!("Followed user {user}"),
        (ActionStatus::Done, Action::Unfollow) => format!("Unfollowed user {user}"),
        (ActionStatus::Skipped, action) => format!("Would {action} user {user}"),
        (ActionStatus::Failed(reason), Action::Follow) => {
            format!("Error following {user}: {reason}")
        }
        (ActionStatus::Failed(reason), Action::Unfollow) => {
            format!("Error unfollowing {user}: {reason}")
        }
    }
}

/// Print the end-of-run summary, or the whole report as JSON.
pub fn finish(report: &SyncReport, json: bool) -> Result<()> {
    if json {
        let output =
            serde_json::to_string_pretty(report).context("failed to serialize report to JSON")?;
        println!("{output}");
        return Ok(());
    }

    let tally = report.tally;
    if report.dry_run {
        println!(
            "Dry run complete: {} follows and {} unfollows planned.",
            report.planned_follows, report.planned_unfollows
        );
    } else {
        println!(
            "Sync complete! Followed {}, unfollowed {}, {} failed.",
            tally.followed, tally.unfollowed, tally.failed
        );
    }
    if report.withheld_unfollows > 0 {
        println!("{} unfollows were withheld.", report.withheld_unfollows);
    }
    if report.has_partial_snapshot() {
        println!("Some listings stopped early; the plan was built from partial data.");
    }
    let failed: Vec<String> = report.failures().map(|o| o.user.to_string()).collect();
    if !failed.is_empty() {
        println!("Failed users: {}", failed.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use followsync_core::UserId;

    fn outcome(action: Action, status: ActionStatus) -> ActionOutcome {
        ActionOutcome {
            action,
            user: UserId::from(42),
            status,
        }
    }

    #[test]
    fn test_describe_outcomes() {
        assert_eq!(
            describe(&outcome(Action::Follow, ActionStatus::Done)),
            "Followed user 42"
        );
        assert_eq!(
            describe(&outcome(Action::Unfollow, ActionStatus::Skipped)),
            "Would unfollow user 42"
        );
        assert_eq!(
            describe(&outcome(Action::Unfollow, ActionStatus::Failed("forbidden".into()))),
            "Error unfollowing 42: forbidden"
        );
    }
}
