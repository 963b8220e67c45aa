//! User-supplied goal logic.

use super::handle::GoalHandle;
use oxidros_action_core::{ActionDescriptor, CancelGoalRequest, DynError, GoalId};

/// Decision of [`ActionCallbacks::on_cancel_goal_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelResponse {
    Reject,
    Accept,
}

/// Callbacks invoked by the action server.
///
/// All of them run on the server task, so they must return quickly. Long work belongs
/// in whatever [`on_execute_goal`](Self::on_execute_goal) starts.
pub trait ActionCallbacks<A: ActionDescriptor>: Send + 'static {
    /// Decide whether to accept a new goal.
    ///
    /// The reply is sent to the client unchanged; the server reads the decision out of
    /// it with [`ActionDescriptor::goal_decision`].
    fn on_new_goal_request(&mut self, goal: &A::Goal) -> A::GoalResponse;

    /// Start executing an accepted goal. Fire-and-forget.
    fn on_execute_goal(&mut self, goal: A::Goal, handle: GoalHandle<A>);

    /// Decide whether to cancel a goal.
    ///
    /// An `Err` is treated as a rejection.
    fn on_cancel_goal_request(
        &mut self,
        request: &CancelGoalRequest,
    ) -> Result<CancelResponse, DynError>;

    /// Tell the execution of `goal_id` to stop. Fire-and-forget.
    ///
    /// The execution reports completion with [`GoalHandle::canceled`].
    fn on_cancel_goal(&mut self, goal_id: GoalId);
}
