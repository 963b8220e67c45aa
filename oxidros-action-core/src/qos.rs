//! Quality of Service profiles for action endpoints and topics.

/// Default depth when a `KeepLast` profile asks for 0 samples.
pub const DEFAULT_DEPTH: usize = 42;

/// QoS history policy - how samples are stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HistoryPolicy {
    /// Only store up to `depth` samples, dropping the oldest once exceeded.
    KeepLast,

    /// Store all samples.
    KeepAll,
}

/// QoS reliability policy - how messages are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReliabilityPolicy {
    /// Guarantee that samples are delivered.
    Reliable,

    /// Attempt to deliver samples, some may be lost.
    BestEffort,
}

/// QoS durability policy - how samples persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurabilityPolicy {
    /// The publisher keeps samples for late-joining subscribers.
    TransientLocal,

    /// Samples are not persistent.
    Volatile,
}

/// A QoS profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub history: HistoryPolicy,

    /// Size of the message queue (and of the late-joiner cache for `TransientLocal`).
    pub depth: usize,

    pub reliability: ReliabilityPolicy,

    pub durability: DurabilityPolicy,
}

impl Default for Profile {
    /// Default QoS profile:
    /// - History: Keep last
    /// - Depth: 10
    /// - Reliability: Reliable
    /// - Durability: Volatile
    fn default() -> Self {
        Self {
            history: HistoryPolicy::KeepLast,
            depth: 10,
            reliability: ReliabilityPolicy::Reliable,
            durability: DurabilityPolicy::Volatile,
        }
    }
}

impl Profile {
    /// Services QoS profile, same as the default.
    pub fn services_default() -> Self {
        Self::default()
    }

    /// Action status topic profile:
    /// - History: Keep last
    /// - Depth: 1
    /// - Reliability: Reliable
    /// - Durability: Transient local
    ///
    /// Late subscribers receive the latest snapshot immediately.
    pub const fn action_status_default() -> Self {
        Self {
            history: HistoryPolicy::KeepLast,
            depth: 1,
            reliability: ReliabilityPolicy::Reliable,
            durability: DurabilityPolicy::TransientLocal,
        }
    }

    pub fn is_transient_local(&self) -> bool {
        self.durability == DurabilityPolicy::TransientLocal
    }

    /// Number of samples to keep.
    ///
    /// `KeepAll` is unbounded; a `KeepLast` depth of 0 becomes [`DEFAULT_DEPTH`].
    pub fn effective_depth(&self) -> usize {
        match self.history {
            HistoryPolicy::KeepAll => usize::MAX,
            HistoryPolicy::KeepLast if self.depth == 0 => DEFAULT_DEPTH,
            HistoryPolicy::KeepLast => self.depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_profile_is_transient_local() {
        let p = Profile::action_status_default();
        assert!(p.is_transient_local());
        assert_eq!(p.effective_depth(), 1);
        assert!(!Profile::default().is_transient_local());
    }

    #[test]
    fn test_effective_depth() {
        let mut p = Profile::default();
        assert_eq!(p.effective_depth(), 10);
        p.depth = 0;
        assert_eq!(p.effective_depth(), DEFAULT_DEPTH);
        p.history = HistoryPolicy::KeepAll;
        assert_eq!(p.effective_depth(), usize::MAX);
    }
}
