//! Action goal status.

/// Status of an action goal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GoalStatus {
    /// Goal status is unknown. Never observed for a tracked goal.
    Unknown = 0,

    /// Goal has been accepted by the action server.
    Accepted = 1,

    /// Goal is currently being executed.
    Executing = 2,

    /// Goal is in the process of being canceled.
    Canceling = 3,

    /// Goal completed successfully.
    Succeeded = 4,

    /// Goal was canceled.
    Canceled = 5,

    /// Goal was aborted by the action server.
    Aborted = 6,
}

impl GoalStatus {
    /// Returns true for `Succeeded`, `Canceled` and `Aborted`.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GoalStatus::Succeeded | GoalStatus::Canceled | GoalStatus::Aborted
        )
    }

    /// Returns true if a goal in this status may be moved to `next`.
    ///
    /// Terminal states are sticky and `Unknown` is never a valid target.
    /// Any other move is allowed.
    pub fn can_transition_to(self, next: GoalStatus) -> bool {
        !self.is_terminal() && next != GoalStatus::Unknown
    }
}

impl From<i8> for GoalStatus {
    fn from(s: i8) -> Self {
        match s {
            1 => GoalStatus::Accepted,
            2 => GoalStatus::Executing,
            3 => GoalStatus::Canceling,
            4 => GoalStatus::Succeeded,
            5 => GoalStatus::Canceled,
            6 => GoalStatus::Aborted,
            _ => GoalStatus::Unknown,
        }
    }
}

impl From<GoalStatus> for i8 {
    fn from(status: GoalStatus) -> Self {
        status as i8
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GoalStatus::Unknown => "UNKNOWN",
            GoalStatus::Accepted => "ACCEPTED",
            GoalStatus::Executing => "EXECUTING",
            GoalStatus::Canceling => "CANCELING",
            GoalStatus::Succeeded => "SUCCEEDED",
            GoalStatus::Canceled => "CANCELED",
            GoalStatus::Aborted => "ABORTED",
        };
        f.write_str(s)
    }
}
