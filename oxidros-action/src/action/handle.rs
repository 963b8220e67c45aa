//! Handles into a running action server.
//!
//! Execution logic never touches server state. It holds a [`GoalHandle`] and sends
//! notifications through it; every notification lands in the server's mailbox and is
//! processed in order with client requests.

use oxidros_action_core::{
    ActionDescriptor, Error, FeedbackMessage, GoalId, GoalStatusArray, RequestId, Result,
};
use tokio::sync::{mpsc, oneshot};

/// Messages processed by the server actor.
pub(crate) enum Command<A: ActionDescriptor> {
    /// A client request forwarded from an endpoint.
    Request {
        request_id: RequestId,
        request: A::Request,
    },
    Feedback(FeedbackMessage<A::Feedback>),
    Result {
        goal_id: GoalId,
        result: A::Result,
    },
    Canceled(GoalId),
    Aborted(GoalId),
    Status(oneshot::Sender<GoalStatusArray>),
    Shutdown,
}

/// Cloneable sender into an action server's mailbox.
///
/// Usable from async tasks and from plain threads alike.
pub struct ActionServerHandle<A: ActionDescriptor> {
    tx: mpsc::UnboundedSender<Command<A>>,
}

impl<A: ActionDescriptor> Clone for ActionServerHandle<A> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<A: ActionDescriptor> ActionServerHandle<A> {
    /// Create a handle and the mailbox it feeds.
    pub fn channel() -> (Self, Mailbox<A>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, Mailbox { rx })
    }

    fn send(&self, cmd: Command<A>) -> Result<()> {
        self.tx.send(cmd).map_err(|_| Error::ServerShutdown)
    }

    /// Forward a client request.
    pub fn submit_request(&self, request_id: RequestId, request: A::Request) -> Result<()> {
        self.send(Command::Request {
            request_id,
            request,
        })
    }

    /// Publish feedback for `goal_id`.
    pub fn publish_feedback(&self, goal_id: GoalId, feedback: A::Feedback) -> Result<()> {
        self.send(Command::Feedback(FeedbackMessage { goal_id, feedback }))
    }

    /// Deliver the result of `goal_id`.
    pub fn publish_result(&self, goal_id: GoalId, result: A::Result) -> Result<()> {
        self.send(Command::Result { goal_id, result })
    }

    /// Report that `goal_id` finished canceling.
    pub fn goal_canceled(&self, goal_id: GoalId) -> Result<()> {
        self.send(Command::Canceled(goal_id))
    }

    /// Report that `goal_id` was aborted.
    pub fn goal_aborted(&self, goal_id: GoalId) -> Result<()> {
        self.send(Command::Aborted(goal_id))
    }

    /// Current status snapshot.
    pub async fn goal_status(&self) -> Result<GoalStatusArray> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Status(tx))?;
        rx.await.map_err(|_| Error::ServerShutdown)
    }

    /// Ask the server to stop.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    /// Returns true once the server has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub(crate) fn goal(&self, goal_id: GoalId) -> GoalHandle<A> {
        GoalHandle {
            goal_id,
            server: self.clone(),
        }
    }
}

/// Receiving end of an action server mailbox.
pub struct Mailbox<A: ActionDescriptor> {
    rx: mpsc::UnboundedReceiver<Command<A>>,
}

impl<A: ActionDescriptor> Mailbox<A> {
    pub(crate) async fn recv(&mut self) -> Option<Command<A>> {
        self.rx.recv().await
    }

    pub(crate) fn try_recv(&mut self) -> Option<Command<A>> {
        self.rx.try_recv().ok()
    }
}

/// Used by execution logic to report on one goal.
pub struct GoalHandle<A: ActionDescriptor> {
    goal_id: GoalId,
    server: ActionServerHandle<A>,
}

impl<A: ActionDescriptor> Clone for GoalHandle<A> {
    fn clone(&self) -> Self {
        Self {
            goal_id: self.goal_id,
            server: self.server.clone(),
        }
    }
}

impl<A: ActionDescriptor> GoalHandle<A> {
    pub fn goal_id(&self) -> GoalId {
        self.goal_id
    }

    /// Publish a feedback.
    pub fn feedback(&self, feedback: A::Feedback) -> Result<()> {
        self.server.publish_feedback(self.goal_id, feedback)
    }

    /// Notify the server that the goal is successfully finished.
    pub fn finish(&self, result: A::Result) -> Result<()> {
        self.server.publish_result(self.goal_id, result)
    }

    /// Notify the server that the goal is successfully canceled.
    pub fn canceled(&self) -> Result<()> {
        self.server.goal_canceled(self.goal_id)
    }

    /// Notify the server that the goal was aborted.
    pub fn abort(&self) -> Result<()> {
        self.server.goal_aborted(self.goal_id)
    }
}
