//! Goal registry: the authoritative goal id -> goal mapping.

use oxidros_action_core::{GoalId, GoalInfo, GoalStatus, GoalStatusArray, GoalStatusEntry, Time};
use std::collections::BTreeMap;

/// One tracked goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    pub id: GoalId,
    pub accepted_at: Time,
    pub status: GoalStatus,
    /// Acceptance order, used to order snapshots.
    seq: u64,
}

impl Goal {
    pub fn info(&self) -> GoalInfo {
        GoalInfo::new(self.id, self.accepted_at)
    }
}

/// Outcome of [`GoalRegistry::mark_goal_as`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The status was overwritten.
    Applied { from: GoalStatus },
    /// The goal is not tracked; nothing happened.
    Untracked,
    /// The goal is in a terminal state (or the target is `Unknown`); nothing happened.
    Refused { from: GoalStatus },
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied { .. })
    }
}

/// Every goal this server ever accepted.
///
/// Goals are never removed; terminal goals stay queryable.
#[derive(Debug, Default)]
pub struct GoalRegistry {
    goals: BTreeMap<GoalId, Goal>,
    next_seq: u64,
}

impl GoalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `id` in the `Accepted` state.
    ///
    /// Returns false (and leaves the existing goal untouched) if `id` is already tracked.
    pub fn insert(&mut self, id: GoalId, accepted_at: Time) -> bool {
        if self.goals.contains_key(&id) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.goals.insert(
            id,
            Goal {
                id,
                accepted_at,
                status: GoalStatus::Accepted,
                seq,
            },
        );
        true
    }

    /// Overwrite the status of `id`, keeping its acceptance stamp.
    ///
    /// Untracked ids are ignored, so stale notifications are harmless.
    /// Terminal states are sticky.
    pub fn mark_goal_as(&mut self, id: &GoalId, status: GoalStatus) -> Transition {
        let Some(goal) = self.goals.get_mut(id) else {
            return Transition::Untracked;
        };
        let from = goal.status;
        if !from.can_transition_to(status) {
            return Transition::Refused { from };
        }
        goal.status = status;
        Transition::Applied { from }
    }

    pub fn get(&self, id: &GoalId) -> Option<&Goal> {
        self.goals.get(id)
    }

    pub fn status(&self, id: &GoalId) -> Option<GoalStatus> {
        self.goals.get(id).map(|g| g.status)
    }

    pub fn contains(&self, id: &GoalId) -> bool {
        self.goals.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Snapshot of every goal, in acceptance order.
    pub fn snapshot(&self) -> GoalStatusArray {
        let mut goals: Vec<&Goal> = self.goals.values().collect();
        goals.sort_by_key(|g| g.seq);
        GoalStatusArray {
            status_list: goals
                .into_iter()
                .map(|g| GoalStatusEntry {
                    goal_info: g.info(),
                    status: g.status,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_untracked_is_noop() {
        let mut reg = GoalRegistry::new();
        for status in [
            GoalStatus::Executing,
            GoalStatus::Succeeded,
            GoalStatus::Canceled,
        ] {
            assert_eq!(
                reg.mark_goal_as(&GoalId::random(), status),
                Transition::Untracked
            );
        }
        assert!(reg.is_empty());
        assert!(reg.snapshot().is_empty());
    }

    #[test]
    fn test_mark_preserves_stamp() {
        let mut reg = GoalRegistry::new();
        let id = GoalId::random();
        let stamp = Time::new(10, 20);
        assert!(reg.insert(id, stamp));
        assert_eq!(reg.status(&id), Some(GoalStatus::Accepted));

        let t = reg.mark_goal_as(&id, GoalStatus::Executing);
        assert_eq!(
            t,
            Transition::Applied {
                from: GoalStatus::Accepted
            }
        );
        let goal = reg.get(&id).unwrap();
        assert_eq!(goal.status, GoalStatus::Executing);
        assert_eq!(goal.accepted_at, stamp);
    }

    #[test]
    fn test_terminal_is_sticky() {
        let mut reg = GoalRegistry::new();
        let id = GoalId::random();
        reg.insert(id, Time::zero());
        reg.mark_goal_as(&id, GoalStatus::Succeeded);
        assert_eq!(
            reg.mark_goal_as(&id, GoalStatus::Executing),
            Transition::Refused {
                from: GoalStatus::Succeeded
            }
        );
        assert_eq!(reg.status(&id), Some(GoalStatus::Succeeded));
    }

    #[test]
    fn test_duplicate_insert_keeps_original() {
        let mut reg = GoalRegistry::new();
        let id = GoalId::random();
        reg.insert(id, Time::new(1, 0));
        reg.mark_goal_as(&id, GoalStatus::Executing);
        assert!(!reg.insert(id, Time::new(2, 0)));
        let goal = reg.get(&id).unwrap();
        assert_eq!(goal.accepted_at, Time::new(1, 0));
        assert_eq!(goal.status, GoalStatus::Executing);
    }

    #[test]
    fn test_snapshot_in_acceptance_order() {
        let mut reg = GoalRegistry::new();
        let ids: Vec<GoalId> = (0..5).map(|_| GoalId::random()).collect();
        for id in &ids {
            reg.insert(*id, Time::now());
        }
        let snapshot = reg.snapshot();
        let order: Vec<GoalId> = snapshot
            .status_list
            .iter()
            .map(|e| e.goal_info.goal_id)
            .collect();
        assert_eq!(order, ids);
    }
}
