//! Pure set arithmetic over follow graphs.
//!
//! Nothing here performs I/O; given the same inputs every function returns the
//! same plan.

use serde::Serialize;

use crate::{IdSet, UserId};

/// Relationship changes computed from one snapshot.
///
/// `to_follow` and `to_unfollow` are always disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    /// Accounts to start following.
    pub to_follow: IdSet,
    /// Accounts to stop following.
    pub to_unfollow: IdSet,
}

impl SyncPlan {
    /// Drop `user` from both sides of the plan.
    #[must_use]
    pub fn excluding(mut self, user: &UserId) -> Self {
        self.to_follow.remove(user);
        self.to_unfollow.remove(user);
        self
    }

    /// Total number of planned actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_follow.len() + self.to_unfollow.len()
    }

    /// Whether there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_follow.is_empty() && self.to_unfollow.is_empty()
    }
}

/// Reconcile `current` following against `target` so that afterwards the
/// caller follows exactly `target`.
#[must_use]
pub fn plan_mirror(current: &IdSet, target: &IdSet) -> SyncPlan {
    SyncPlan {
        to_follow: target.difference(current).cloned().collect(),
        to_unfollow: current.difference(target).cloned().collect(),
    }
}

/// Followers not yet followed back.
#[must_use]
pub fn follow_back(followers: &IdSet, following: &IdSet) -> IdSet {
    followers.difference(following).cloned().collect()
}

/// [`follow_back`] as a plan that never unfollows.
#[must_use]
pub fn plan_follow_back(followers: &IdSet, following: &IdSet) -> SyncPlan {
    SyncPlan {
        to_follow: follow_back(followers, following),
        to_unfollow: IdSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> IdSet {
        raw.iter().copied().map(UserId::from).collect()
    }

    #[test]
    fn test_mirror_overlapping_sets() {
        let plan = plan_mirror(&ids(&[1, 2, 3]), &ids(&[2, 3, 4]));
        assert_eq!(plan.to_unfollow, ids(&[1]));
        assert_eq!(plan.to_follow, ids(&[4]));
    }

    #[test]
    fn test_mirror_from_nothing() {
        let plan = plan_mirror(&ids(&[]), &ids(&[5, 6]));
        assert!(plan.to_unfollow.is_empty());
        assert_eq!(plan.to_follow, ids(&[5, 6]));
    }

    #[test]
    fn test_mirror_empty_target_unfollows_everything() {
        let plan = plan_mirror(&ids(&[7, 8]), &ids(&[]));
        assert_eq!(plan.to_unfollow, ids(&[7, 8]));
        assert!(plan.to_follow.is_empty());
    }

    #[test]
    fn test_mirror_of_equal_sets_is_empty() {
        let plan = plan_mirror(&ids(&[1, 2]), &ids(&[1, 2]));
        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
    }

    #[test]
    fn test_follow_back() {
        assert_eq!(follow_back(&ids(&[10, 11, 12]), &ids(&[11])), ids(&[10, 12]));

        let plan = plan_follow_back(&ids(&[10, 11, 12]), &ids(&[11]));
        assert_eq!(plan.to_follow, ids(&[10, 12]));
        assert!(plan.to_unfollow.is_empty());
    }

    #[test]
    fn test_excluding_self() {
        let plan = plan_mirror(&ids(&[1]), &ids(&[2, 99])).excluding(&UserId::from(99));
        assert_eq!(plan.to_follow, ids(&[2]));
        assert_eq!(plan.to_unfollow, ids(&[1]));
        assert_eq!(plan.len(), 2);
    }
}
