//! Cancellation protocol.
//!
//! Two phases: the cancel-goal service decides synchronously whether a goal enters
//! `CANCELING`, and the execution later reports that it actually stopped.

use super::{
    callbacks::{ActionCallbacks, CancelResponse},
    coordinator::Coordinator,
};
use oxidros_action_core::{
    ActionDescriptor, ActionOutbox, CancelGoalRequest, CancelGoalResponse, CancelReturnCode,
    GoalId, GoalStatus,
};
use tracing::{debug, error, info};

impl<A, C, O> Coordinator<A, C, O>
where
    A: ActionDescriptor,
    C: ActionCallbacks<A>,
    O: ActionOutbox<A>,
{
    /// Handle a cancel request.
    ///
    /// Only single-goal cancellation is supported; the all-zero id is rejected.
    pub fn handle_cancel_request(&mut self, request: &CancelGoalRequest) -> CancelGoalResponse {
        let goal_id = request.goal_info.goal_id;
        if goal_id.is_zero() {
            debug!("cancel of all goals requested, not supported");
            return CancelGoalResponse::with_code(CancelReturnCode::Rejected);
        }

        let Some(goal) = self.registry.get(&goal_id) else {
            debug!(%goal_id, "cancel requested for unknown goal");
            return CancelGoalResponse::with_code(CancelReturnCode::UnknownGoalId);
        };
        if goal.status.is_terminal() {
            debug!(%goal_id, status = %goal.status, "cancel requested for finished goal");
            return CancelGoalResponse::with_code(CancelReturnCode::GoalTerminated);
        }
        let info = goal.info();

        match self.callbacks.on_cancel_goal_request(request) {
            Ok(CancelResponse::Accept) => {
                self.callbacks.on_cancel_goal(goal_id);
                self.registry.mark_goal_as(&goal_id, GoalStatus::Canceling);
                info!(%goal_id, "goal canceling");
                self.publish_status();
                CancelGoalResponse {
                    return_code: CancelReturnCode::None,
                    goals_canceling: vec![info],
                }
            }
            Ok(CancelResponse::Reject) => {
                debug!(%goal_id, "cancel rejected");
                CancelGoalResponse::with_code(CancelReturnCode::Rejected)
            }
            Err(e) => {
                error!(%goal_id, "cancel callback failed, rejecting: {e}");
                CancelGoalResponse::with_code(CancelReturnCode::Rejected)
            }
        }
    }

    /// Handle the execution reporting that `goal_id` stopped after a cancel.
    ///
    /// Drops any result cached for the goal so it is never handed out later.
    pub fn goal_canceled(&mut self, goal_id: GoalId) {
        if self.finish_without_result(goal_id, GoalStatus::Canceled) {
            info!(%goal_id, "goal canceled");
        }
    }
}
