//! Collaborator traits for action servers.
//!
//! An action server talks to two kinds of collaborators:
//!
//! - an [`ActionDescriptor`], which knows the concrete message shapes of one action and
//!   classifies raw inbound requests;
//! - a transport ([`ActionTransport`]), which serves the request endpoints, publishes
//!   topics, and routes asynchronous responses back to clients.
//!
//! The server itself only writes through an [`ActionOutbox`]; any transport can be
//! adapted into one.
//!
//! # Traits
//!
//! - [`ActionDescriptor`] - message shapes and request classification
//! - [`ActionOutbox`] - status/feedback publication and responses
//! - [`ActionTransport`] - creates endpoints and publishers
//! - [`RosPublisher`] - publishes messages to a topic
//! - [`RosEndpoint`] - receives requests on a service

use crate::{
    error::Result,
    msg::{
        CancelGoalRequest, CancelGoalResponse, FeedbackMessage, GoalId, GoalStatusArray,
        RequestId, ResultResponse,
    },
    qos::Profile,
};
use std::fmt::{self, Debug};

// ============================================================================
// Descriptor
// ============================================================================

/// Accept/reject decision read out of a goal response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalDecision {
    Reject = 0,
    Accept = 1,
}

impl TryFrom<u8> for GoalDecision {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            0 => Ok(GoalDecision::Reject),
            1 => Ok(GoalDecision::Accept),
            other => Err(other),
        }
    }
}

/// A raw request after classification.
pub enum ActionRequest<A: ActionDescriptor> {
    /// A goal submission.
    SendGoal(A::Goal),
    /// A request for the result of a goal.
    GetResult(GoalId),
    /// A cancel request.
    CancelGoal(CancelGoalRequest),
    /// Anything the descriptor could not make sense of.
    Unrecognized(String),
}

impl<A: ActionDescriptor> Debug for ActionRequest<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionRequest::SendGoal(goal) => f.debug_tuple("SendGoal").field(goal).finish(),
            ActionRequest::GetResult(id) => f.debug_tuple("GetResult").field(id).finish(),
            ActionRequest::CancelGoal(req) => f.debug_tuple("CancelGoal").field(req).finish(),
            ActionRequest::Unrecognized(why) => f.debug_tuple("Unrecognized").field(why).finish(),
        }
    }
}

/// A reply to a client request.
pub enum ActionReply<A: ActionDescriptor> {
    /// Reply to a goal submission, as produced by the goal callback.
    Goal(A::GoalResponse),
    /// Reply to a result request.
    Result(ResultResponse<A::Result>),
    /// Reply to a cancel request.
    Cancel(CancelGoalResponse),
    /// Generic error marker for requests the server could not handle.
    Error(String),
}

impl<A: ActionDescriptor> Debug for ActionReply<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionReply::Goal(resp) => f.debug_tuple("Goal").field(resp).finish(),
            ActionReply::Result(resp) => f.debug_tuple("Result").field(resp).finish(),
            ActionReply::Cancel(resp) => f.debug_tuple("Cancel").field(resp).finish(),
            ActionReply::Error(why) => f.debug_tuple("Error").field(why).finish(),
        }
    }
}

/// Describes one action type.
///
/// The server never looks inside the associated types; everything it needs to know
/// goes through these methods.
///
/// # Example
///
/// ```
/// use oxidros_action_core::{ActionDescriptor, ActionRequest, CancelGoalRequest, GoalId};
///
/// #[derive(Debug)]
/// enum Raw {
///     Goal { id: GoalId, order: u32 },
///     Result(GoalId),
///     Cancel(CancelGoalRequest),
/// }
///
/// struct Fibonacci;
///
/// impl ActionDescriptor for Fibonacci {
///     type Request = Raw;
///     type Goal = (GoalId, u32);
///     type GoalResponse = bool;
///     type Result = Vec<u64>;
///     type Feedback = Vec<u64>;
///
///     fn action_name(&self) -> &str {
///         "fibonacci"
///     }
///
///     fn classify(&self, request: Raw) -> ActionRequest<Self> {
///         match request {
///             Raw::Goal { id, order } => ActionRequest::SendGoal((id, order)),
///             Raw::Result(id) => ActionRequest::GetResult(id),
///             Raw::Cancel(req) => ActionRequest::CancelGoal(req),
///         }
///     }
///
///     fn goal_id(&self, goal: &(GoalId, u32)) -> GoalId {
///         goal.0
///     }
///
///     fn goal_decision(&self, accepted: &bool) -> u8 {
///         *accepted as u8
///     }
/// }
/// ```
pub trait ActionDescriptor: Send + Sync + Sized + 'static {
    /// Raw inbound request shape, shared by the three endpoints.
    type Request: Send + Debug + 'static;

    /// Goal submission message.
    type Goal: Send + Debug + 'static;

    /// Reply produced by the goal callback.
    type GoalResponse: Send + Debug + 'static;

    /// Result payload.
    type Result: Send + Clone + Debug + 'static;

    /// Feedback payload.
    type Feedback: Send + Sync + Clone + Debug + 'static;

    /// Name of the action.
    fn action_name(&self) -> &str;

    /// Classify a raw request.
    fn classify(&self, request: Self::Request) -> ActionRequest<Self>;

    /// Extract the goal id from a goal submission.
    fn goal_id(&self, goal: &Self::Goal) -> GoalId;

    /// Extract the decision code (0 = reject, 1 = accept) from a goal response.
    fn goal_decision(&self, response: &Self::GoalResponse) -> u8;
}

// ============================================================================
// Outbox
// ============================================================================

/// Where an action server writes.
pub trait ActionOutbox<A: ActionDescriptor>: Send {
    /// Publish a full status snapshot.
    fn publish_status(&self, status: &GoalStatusArray) -> Result<()>;

    /// Publish feedback.
    fn publish_feedback(&self, feedback: &FeedbackMessage<A::Feedback>) -> Result<()>;

    /// Respond to a previously received request.
    fn send_response(&self, request_id: &RequestId, reply: ActionReply<A>) -> Result<()>;
}

// ============================================================================
// Transport
// ============================================================================

/// Publishes messages to a topic.
pub trait RosPublisher<T>: Send + Sync {
    /// Get the topic name.
    fn topic_name(&self) -> &str;

    /// Publish a message.
    fn send(&self, msg: &T) -> Result<()>;
}

/// Receives requests on a service.
pub trait RosEndpoint<A: ActionDescriptor>: Send {
    /// Get the service name.
    fn service_name(&self) -> &str;

    /// Receive a request asynchronously.
    ///
    /// The returned [`RequestId`] is what the response must be addressed to.
    fn recv(&mut self) -> impl std::future::Future<Output = Result<(RequestId, A::Request)>> + Send;
}

/// A transport able to host an action server.
pub trait ActionTransport<A: ActionDescriptor>: Send + Sync + 'static {
    /// The publisher type created by this transport.
    type Publisher<T: Clone + Send + Sync + 'static>: RosPublisher<T> + 'static;

    /// The endpoint type created by this transport.
    type Endpoint: RosEndpoint<A> + 'static;

    /// Start serving requests on `service_name`.
    fn create_endpoint(&self, service_name: &str, qos: Option<Profile>) -> Result<Self::Endpoint>;

    /// Create a publisher on `topic_name`.
    fn create_publisher<T: Clone + Send + Sync + 'static>(
        &self,
        topic_name: &str,
        qos: Option<Profile>,
    ) -> Result<Self::Publisher<T>>;

    /// Respond to a request received on any endpoint of this transport.
    fn send_response(&self, request_id: &RequestId, reply: ActionReply<A>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_decision_codes() {
        assert_eq!(GoalDecision::try_from(0), Ok(GoalDecision::Reject));
        assert_eq!(GoalDecision::try_from(1), Ok(GoalDecision::Accept));
        assert_eq!(GoalDecision::try_from(7), Err(7));
    }
}
