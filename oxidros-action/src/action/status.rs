//! Status and feedback publication.

use super::{callbacks::ActionCallbacks, coordinator::Coordinator};
use oxidros_action_core::{ActionDescriptor, ActionOutbox, FeedbackMessage, GoalStatusArray};
use tracing::{error, trace};

impl<A, C, O> Coordinator<A, C, O>
where
    A: ActionDescriptor,
    C: ActionCallbacks<A>,
    O: ActionOutbox<A>,
{
    /// Snapshot of every tracked goal.
    pub fn status_snapshot(&self) -> GoalStatusArray {
        self.registry.snapshot()
    }

    /// Publish the full snapshot. Called after every state change.
    pub(super) fn publish_status(&self) {
        let snapshot = self.status_snapshot();
        trace!(goals = snapshot.len(), "publishing status");
        if let Err(e) = self.outbox.publish_status(&snapshot) {
            error!("failed to publish goal status: {e}");
        }
    }

    /// Forward feedback as-is. Does not look at goal state.
    pub fn publish_feedback(&self, feedback: &FeedbackMessage<A::Feedback>) {
        if let Err(e) = self.outbox.publish_feedback(feedback) {
            error!(goal_id = %feedback.goal_id, "failed to publish feedback: {e}");
        }
    }
}
