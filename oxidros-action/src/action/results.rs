//! Result reconciliation store.
//!
//! A result request and the result itself can arrive in either order. Whichever
//! arrives second consumes the first:
//!
//! - a request that finds no result is queued as *pending*;
//! - a result that finds no pending request is *cached*.
//!
//! For a given goal at most one of the two sides holds entries at any time. Only
//! pending requests expire: a cached result stays until a client takes it or the
//! goal finishes without one.

use oxidros_action_core::{GoalId, RequestId};
use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

#[derive(Debug, Clone)]
struct PendingRequest {
    request_id: RequestId,
    queued_at: Instant,
}

/// Pending result requests and cached results, keyed by goal id.
#[derive(Debug)]
pub struct ResultStore<R> {
    pending: BTreeMap<GoalId, Vec<PendingRequest>>,
    cached: BTreeMap<GoalId, R>,
}

impl<R> Default for ResultStore<R> {
    fn default() -> Self {
        Self {
            pending: BTreeMap::new(),
            cached: BTreeMap::new(),
        }
    }
}

impl<R> ResultStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request for a result that does not exist yet.
    pub fn enqueue(&mut self, goal_id: GoalId, request_id: RequestId, now: Instant) {
        self.pending.entry(goal_id).or_default().push(PendingRequest {
            request_id,
            queued_at: now,
        });
    }

    /// Remove and return every request waiting on `goal_id`, in arrival order.
    pub fn take_pending(&mut self, goal_id: &GoalId) -> Vec<RequestId> {
        self.pending
            .remove(goal_id)
            .map(|reqs| reqs.into_iter().map(|r| r.request_id).collect())
            .unwrap_or_default()
    }

    pub fn pending_count(&self, goal_id: &GoalId) -> usize {
        self.pending.get(goal_id).map_or(0, Vec::len)
    }

    /// Cache a result nobody asked for yet.
    ///
    /// Returns false, keeping the first payload, if a result is already cached.
    pub fn cache(&mut self, goal_id: GoalId, payload: R) -> bool {
        if self.cached.contains_key(&goal_id) {
            return false;
        }
        self.cached.insert(goal_id, payload);
        true
    }

    /// Remove and return the cached result of `goal_id`.
    pub fn take_cached(&mut self, goal_id: &GoalId) -> Option<R> {
        self.cached.remove(goal_id)
    }

    /// Drop the cached result of `goal_id`. Returns true if there was one.
    pub fn discard_cached(&mut self, goal_id: &GoalId) -> bool {
        self.cached.remove(goal_id).is_some()
    }

    pub fn is_cached(&self, goal_id: &GoalId) -> bool {
        self.cached.contains_key(goal_id)
    }

    /// Remove pending requests queued at least `timeout` ago.
    pub fn expire(&mut self, now: Instant, timeout: Duration) -> Vec<(GoalId, RequestId)> {
        let mut expired = Vec::new();
        self.pending.retain(|goal_id, reqs| {
            reqs.retain(|r| {
                if now.saturating_duration_since(r.queued_at) >= timeout {
                    expired.push((*goal_id, r.request_id));
                    false
                } else {
                    true
                }
            });
            !reqs.is_empty()
        });
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(seq: i64) -> RequestId {
        RequestId::new([1; 16], seq)
    }

    #[test]
    fn test_pending_in_arrival_order() {
        let mut store = ResultStore::<u32>::new();
        let g = GoalId::random();
        let now = Instant::now();
        store.enqueue(g, req(1), now);
        store.enqueue(g, req(2), now);
        store.enqueue(GoalId::random(), req(3), now);
        assert_eq!(store.pending_count(&g), 2);
        assert_eq!(store.take_pending(&g), vec![req(1), req(2)]);
        assert!(store.take_pending(&g).is_empty());
    }

    #[test]
    fn test_cache_consumed_once() {
        let mut store = ResultStore::new();
        let g = GoalId::random();
        assert!(store.cache(g, "done"));
        assert!(store.is_cached(&g));
        assert_eq!(store.take_cached(&g), Some("done"));
        assert_eq!(store.take_cached(&g), None);
    }

    #[test]
    fn test_first_cached_result_wins() {
        let mut store = ResultStore::new();
        let g = GoalId::random();
        assert!(store.cache(g, 1));
        assert!(!store.cache(g, 2));
        assert_eq!(store.take_cached(&g), Some(1));
    }

    #[test]
    fn test_discard_cached() {
        let mut store = ResultStore::new();
        let g = GoalId::random();
        assert!(!store.discard_cached(&g));
        store.cache(g, 7);
        assert!(store.discard_cached(&g));
        assert!(!store.is_cached(&g));
    }

    #[test]
    fn test_expire() {
        let mut store = ResultStore::new();
        let old = Instant::now();
        let fresh = old + Duration::from_secs(30);
        let now = old + Duration::from_secs(60);

        let g_old = GoalId::random();
        let g_fresh = GoalId::random();
        store.enqueue(g_old, req(1), old);
        store.enqueue(g_fresh, req(2), fresh);
        let g_cached = GoalId::random();
        store.cache(g_cached, 2);

        let expired = store.expire(now, Duration::from_secs(45));
        assert_eq!(expired, vec![(g_old, req(1))]);
        assert_eq!(store.pending_count(&g_old), 0);
        assert_eq!(store.pending_count(&g_fresh), 1);

        // Cached results are never expired.
        let expired = store.expire(now + Duration::from_secs(3600), Duration::from_secs(45));
        assert_eq!(expired, vec![(g_fresh, req(2))]);
        assert!(store.is_cached(&g_cached));
    }
}
