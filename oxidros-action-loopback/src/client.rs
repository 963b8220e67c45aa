//! Action client over the loopback transport.

use crate::{
    LoopbackTransport,
    service::{Client, PendingReply},
    topic::Subscriber,
};
use oxidros_action_core::{ActionDescriptor, ActionNames, FeedbackMessage, GoalStatusArray, Result};
use std::sync::Arc;

/// The client side of one action: three service clients and the two topics.
///
/// Requests are built by the caller; this type only routes them to the right
/// endpoint.
pub struct ActionClient<A: ActionDescriptor> {
    transport: Arc<LoopbackTransport<A>>,
    names: ActionNames,
    goal: Client<A>,
    result: Client<A>,
    cancel: Client<A>,
}

impl<A: ActionDescriptor> ActionClient<A> {
    pub fn new(transport: &Arc<LoopbackTransport<A>>, action_name: &str) -> Result<Self> {
        let names = ActionNames::new(action_name)?;
        Ok(Self {
            goal: transport.create_client(&names.send_goal),
            result: transport.create_client(&names.get_result),
            cancel: transport.create_client(&names.cancel_goal),
            names,
            transport: transport.clone(),
        })
    }

    pub fn names(&self) -> &ActionNames {
        &self.names
    }

    /// Returns true once all three endpoints are served.
    pub fn is_server_available(&self) -> bool {
        self.goal.is_service_available()
            && self.result.is_service_available()
            && self.cancel.is_service_available()
    }

    pub fn send_goal(&self, request: A::Request) -> Result<PendingReply<A>> {
        self.goal.call(request)
    }

    pub fn get_result(&self, request: A::Request) -> Result<PendingReply<A>> {
        self.result.call(request)
    }

    pub fn cancel_goal(&self, request: A::Request) -> Result<PendingReply<A>> {
        self.cancel.call(request)
    }

    /// Subscribe to the status topic. The latest snapshot, if any, arrives first.
    pub fn subscribe_status(&self) -> Result<Subscriber<GoalStatusArray>> {
        self.transport.create_subscriber(&self.names.status)
    }

    pub fn subscribe_feedback(&self) -> Result<Subscriber<FeedbackMessage<A::Feedback>>> {
        self.transport.create_subscriber(&self.names.feedback)
    }
}
