//! followsync core
//!
//! Platform-neutral half of followsync: user identifiers, the [`SocialGraph`]
//! seam that platform clients implement, the pure diff engine, and the
//! workflows that turn two fetched ID sets into follow/unfollow calls.
//!
//! ## Modes
//!
//! - **mirror**: follow exactly the followers of a target account
//!   (unfollow extras, follow missing)
//! - **follow-back**: follow every follower of an account that the account
//!   does not already follow

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod diff;
mod error;
pub mod execute;
mod graph;
mod ids;
mod report;
pub mod workflow;

pub use diff::SyncPlan;
pub use error::{GraphError, GraphResult};
pub use execute::{Action, ActionOutcome, ActionStatus, ApplyOptions};
pub use graph::{Collected, Relation, SocialGraph};
pub use ids::{IdSet, UserId};
pub use report::{Mode, SnapshotSummary, SyncReport, Tally};
pub use workflow::{MirrorOptions, SyncEvent};
