//! Message shapes exchanged by an action server.
//!
//! These mirror `action_msgs` and `unique_identifier_msgs`:
//!
//! | Type | ROS 2 counterpart |
//! |------|-------------------|
//! | [`GoalId`] | `unique_identifier_msgs/UUID` |
//! | [`GoalInfo`] | `action_msgs/GoalInfo` |
//! | [`GoalStatusEntry`] | `action_msgs/GoalStatus` |
//! | [`GoalStatusArray`] | `action_msgs/GoalStatusArray` |
//! | [`CancelGoalRequest`] / [`CancelGoalResponse`] | `action_msgs/CancelGoal` |
//!
//! Goal, result and feedback payloads are owned by the
//! [`ActionDescriptor`](crate::api::ActionDescriptor).

use crate::{action::GoalStatus, time::Time};
use std::fmt;

/// Size of a goal id and of a client GID.
pub const UUID_SIZE: usize = 16;

/// Opaque goal identifier chosen by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoalId(pub [u8; UUID_SIZE]);

impl GoalId {
    /// The all-zero id. A cancel request carrying it asks for every goal.
    pub const ZERO: GoalId = GoalId([0; UUID_SIZE]);

    /// Draw a random v4 id. Clients use this; the server never invents goal ids.
    pub fn random() -> Self {
        GoalId(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Returns true for [`GoalId::ZERO`].
    pub fn is_zero(&self) -> bool {
        self.0 == [0; UUID_SIZE]
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; UUID_SIZE] {
        &self.0
    }
}

impl From<[u8; UUID_SIZE]> for GoalId {
    fn from(uuid: [u8; UUID_SIZE]) -> Self {
        GoalId(uuid)
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_bytes(self.0).hyphenated())
    }
}

/// Identifies a received request so it can be answered later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestId {
    /// GID of the requesting client.
    pub client_gid: [u8; UUID_SIZE],
    /// Per-client request sequence number.
    pub sequence_number: i64,
}

impl RequestId {
    pub const fn new(client_gid: [u8; UUID_SIZE], sequence_number: i64) -> Self {
        Self {
            client_gid,
            sequence_number,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}",
            uuid::Uuid::from_bytes(self.client_gid).simple(),
            self.sequence_number
        )
    }
}

/// Goal id plus the time the goal was accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoalInfo {
    pub goal_id: GoalId,
    pub stamp: Time,
}

impl GoalInfo {
    pub fn new(goal_id: GoalId, stamp: Time) -> Self {
        Self { goal_id, stamp }
    }
}

/// One line of a status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoalStatusEntry {
    pub goal_info: GoalInfo,
    pub status: GoalStatus,
}

/// Full snapshot of every tracked goal, published on the status topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoalStatusArray {
    pub status_list: Vec<GoalStatusEntry>,
}

impl GoalStatusArray {
    /// Status of `goal_id` in this snapshot, if present.
    pub fn status_of(&self, goal_id: &GoalId) -> Option<GoalStatus> {
        self.status_list
            .iter()
            .find(|e| e.goal_info.goal_id == *goal_id)
            .map(|e| e.status)
    }

    pub fn len(&self) -> usize {
        self.status_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.status_list.is_empty()
    }
}

/// Request body of the cancel-goal service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CancelGoalRequest {
    pub goal_info: GoalInfo,
}

impl CancelGoalRequest {
    pub fn new(goal_id: GoalId, stamp: Time) -> Self {
        Self {
            goal_info: GoalInfo::new(goal_id, stamp),
        }
    }
}

/// Return code of the cancel-goal service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CancelReturnCode {
    /// At least one goal entered `CANCELING`.
    None = 0,
    /// The request was rejected.
    Rejected = 1,
    /// The goal id is not tracked by this server.
    UnknownGoalId = 2,
    /// The goal is already in a terminal state.
    GoalTerminated = 3,
}

impl From<CancelReturnCode> for i8 {
    fn from(code: CancelReturnCode) -> Self {
        code as i8
    }
}

impl TryFrom<i8> for CancelReturnCode {
    type Error = i8;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CancelReturnCode::None),
            1 => Ok(CancelReturnCode::Rejected),
            2 => Ok(CancelReturnCode::UnknownGoalId),
            3 => Ok(CancelReturnCode::GoalTerminated),
            other => Err(other),
        }
    }
}

/// Response body of the cancel-goal service.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CancelGoalResponse {
    pub return_code: CancelReturnCode,
    pub goals_canceling: Vec<GoalInfo>,
}

impl CancelGoalResponse {
    /// A response with `code` and no canceling goals.
    pub fn with_code(code: CancelReturnCode) -> Self {
        Self {
            return_code: code,
            goals_canceling: Vec::new(),
        }
    }
}

/// Response body of the get-result service.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultResponse<R> {
    /// Status of the goal when the response was produced.
    pub status: GoalStatus,
    /// The payload; `None` when the goal ended without one.
    pub result: Option<R>,
}

impl<R> ResultResponse<R> {
    /// A successful result.
    pub fn succeeded(result: R) -> Self {
        Self {
            status: GoalStatus::Succeeded,
            result: Some(result),
        }
    }

    /// A response carrying only a status.
    pub fn status_only(status: GoalStatus) -> Self {
        Self {
            status,
            result: None,
        }
    }
}

/// Feedback published on the feedback topic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedbackMessage<F> {
    pub goal_id: GoalId,
    pub feedback: F,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_goal_id() {
        assert!(GoalId::ZERO.is_zero());
        assert!(GoalId::default().is_zero());
        assert!(!GoalId::random().is_zero());
    }

    #[test]
    fn test_goal_id_display() {
        let mut bytes = [0u8; UUID_SIZE];
        bytes[15] = 1;
        assert_eq!(
            GoalId(bytes).to_string(),
            "00000000-0000-0000-0000-000000000001"
        );
    }

    #[test]
    fn test_status_of() {
        let g1 = GoalId::random();
        let g2 = GoalId::random();
        let array = GoalStatusArray {
            status_list: vec![GoalStatusEntry {
                goal_info: GoalInfo::new(g1, Time::zero()),
                status: GoalStatus::Executing,
            }],
        };
        assert_eq!(array.status_of(&g1), Some(GoalStatus::Executing));
        assert_eq!(array.status_of(&g2), None);
    }

    #[test]
    fn test_cancel_code_conversion() {
        assert_eq!(i8::from(CancelReturnCode::GoalTerminated), 3);
        assert_eq!(CancelReturnCode::try_from(2), Ok(CancelReturnCode::UnknownGoalId));
        assert_eq!(CancelReturnCode::try_from(9), Err(9));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_status_array_json() {
        let array = GoalStatusArray {
            status_list: vec![GoalStatusEntry {
                goal_info: GoalInfo::new(GoalId::ZERO, Time::new(1, 2)),
                status: GoalStatus::Canceling,
            }],
        };
        let json = serde_json::to_string(&array).unwrap();
        let back: GoalStatusArray = serde_json::from_str(&json).unwrap();
        assert_eq!(back, array);
    }
}
