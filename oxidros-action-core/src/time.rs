//! Time stamps carried in goal info.

use std::time::{Duration, SystemTime};

/// A `builtin_interfaces/Time` style stamp.
///
/// `sec` is an `i32`, so stamps past 2038 saturate at `i32::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time {
    /// Seconds since UNIX epoch.
    pub sec: i32,

    /// Nanoseconds component.
    pub nanosec: u32,
}

impl Time {
    /// Creates a new stamp.
    pub const fn new(sec: i32, nanosec: u32) -> Self {
        Self { sec, nanosec }
    }

    /// The UNIX epoch.
    pub const fn zero() -> Self {
        Self { sec: 0, nanosec: 0 }
    }

    /// Current system time.
    pub fn now() -> Self {
        SystemTime::now().into()
    }
}

impl From<&SystemTime> for Time {
    fn from(t: &SystemTime) -> Self {
        // Clocks set before the epoch collapse to zero.
        let dur = t
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);

        match i32::try_from(dur.as_secs()) {
            Ok(sec) => Time {
                sec,
                nanosec: dur.subsec_nanos(),
            },
            Err(_) => Time {
                sec: i32::MAX,
                nanosec: 999_999_999,
            },
        }
    }
}

impl From<SystemTime> for Time {
    fn from(t: SystemTime) -> Self {
        (&t).into()
    }
}

impl From<&Time> for SystemTime {
    fn from(t: &Time) -> Self {
        let secs = Duration::from_secs(t.sec.max(0) as u64);
        SystemTime::UNIX_EPOCH + secs + Duration::from_nanos(t.nanosec as u64)
    }
}

impl From<Time> for SystemTime {
    fn from(t: Time) -> Self {
        (&t).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_roundtrip() {
        let t = Time::new(1_700_000_000, 123_456_789);
        let sys: SystemTime = t.into();
        assert_eq!(Time::from(sys), t);
    }

    #[test]
    fn test_far_future_saturates() {
        let far = SystemTime::UNIX_EPOCH + Duration::from_secs(u32::MAX as u64 * 2);
        let t = Time::from(far);
        assert_eq!(t.sec, i32::MAX);
    }

    #[test]
    fn test_before_epoch_is_zero() {
        let before = SystemTime::UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(Time::from(before), Time::zero());
    }

    #[test]
    fn test_now_is_after_epoch() {
        assert!(Time::now() > Time::zero());
    }
}
