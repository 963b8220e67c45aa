//! The action server actor.
//!
//! One task owns the [`Coordinator`]. Each of the three request endpoints gets a
//! forwarder task that pushes requests into the coordinator's mailbox; execution logic
//! pushes its notifications into the same mailbox through [`GoalHandle`]s.
//!
//! [`GoalHandle`]: super::handle::GoalHandle

use super::{
    callbacks::ActionCallbacks,
    coordinator::Coordinator,
    handle::{ActionServerHandle, Mailbox},
};
use crate::options::ServerOptions;
use futures_util::future::join_all;
use oxidros_action_core::{
    ActionDescriptor, ActionNames, ActionOutbox, ActionReply, ActionTransport, Error,
    FeedbackMessage, GoalStatusArray, RequestId, Result, RosEndpoint, RosPublisher,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{Instrument, debug, error, info, info_span};

/// [`ActionOutbox`] writing through an [`ActionTransport`].
pub struct TransportOutbox<A: ActionDescriptor, T: ActionTransport<A>> {
    transport: Arc<T>,
    status: T::Publisher<GoalStatusArray>,
    feedback: T::Publisher<FeedbackMessage<A::Feedback>>,
}

impl<A, T> TransportOutbox<A, T>
where
    A: ActionDescriptor,
    T: ActionTransport<A>,
{
    /// Create the status and feedback publishers of `names` on `transport`.
    pub fn new(transport: Arc<T>, names: &ActionNames, options: &ServerOptions) -> Result<Self> {
        let qos = &options.qos;
        let status = transport.create_publisher(&names.status, Some(qos.status_topic.clone()))?;
        let feedback =
            transport.create_publisher(&names.feedback, Some(qos.feedback_topic.clone()))?;
        Ok(Self {
            transport,
            status,
            feedback,
        })
    }
}

impl<A, T> ActionOutbox<A> for TransportOutbox<A, T>
where
    A: ActionDescriptor,
    T: ActionTransport<A>,
{
    fn publish_status(&self, status: &GoalStatusArray) -> Result<()> {
        self.status.send(status)
    }

    fn publish_feedback(&self, feedback: &FeedbackMessage<A::Feedback>) -> Result<()> {
        self.feedback.send(feedback)
    }

    fn send_response(&self, request_id: &RequestId, reply: ActionReply<A>) -> Result<()> {
        self.transport.send_response(request_id, reply)
    }
}

/// An action server bound to a transport.
///
/// # Example
///
/// ```ignore
/// let server = ActionServer::new(transport, Fibonacci, callbacks, ServerOptions::default())?;
/// let handle = server.handle();
/// let task = server.spawn();
/// // ...
/// handle.shutdown()?;
/// task.await??;
/// ```
pub struct ActionServer<A, C, T>
where
    A: ActionDescriptor,
    T: ActionTransport<A>,
{
    coordinator: Coordinator<A, C, TransportOutbox<A, T>>,
    mailbox: Mailbox<A>,
    handle: ActionServerHandle<A>,
    endpoints: Vec<T::Endpoint>,
    expiry_check_period: Duration,
    names: ActionNames,
}

impl<A, C, T> ActionServer<A, C, T>
where
    A: ActionDescriptor,
    C: ActionCallbacks<A>,
    T: ActionTransport<A>,
{
    /// Create the endpoints and publishers of the action named by `descriptor`.
    pub fn new(
        transport: Arc<T>,
        descriptor: A,
        callbacks: C,
        options: ServerOptions,
    ) -> Result<Self> {
        options.validate()?;
        let names = ActionNames::new(descriptor.action_name())?;

        let qos = &options.qos;
        let endpoints = vec![
            transport.create_endpoint(&names.send_goal, Some(qos.goal_service.clone()))?,
            transport.create_endpoint(&names.get_result, Some(qos.result_service.clone()))?,
            transport.create_endpoint(&names.cancel_goal, Some(qos.cancel_service.clone()))?,
        ];
        let outbox = TransportOutbox::new(transport, &names, &options)?;

        let (handle, mailbox) = ActionServerHandle::channel();
        let coordinator = Coordinator::new(
            descriptor,
            callbacks,
            outbox,
            handle.clone(),
            qos.result_timeout,
        );

        debug!(action = %names.action, "action server created");
        Ok(Self {
            coordinator,
            mailbox,
            handle,
            endpoints,
            expiry_check_period: options.expiry_check_period,
            names,
        })
    }

    /// A handle to the server. Stays valid after [`run`](Self::run) is called.
    pub fn handle(&self) -> ActionServerHandle<A> {
        self.handle.clone()
    }

    /// Names of the endpoints and topics of this server.
    pub fn names(&self) -> &ActionNames {
        &self.names
    }

    /// Serve until [`ActionServerHandle::shutdown`] is called.
    pub async fn run(self) -> Result<()> {
        let span = info_span!("action_server", action = %self.names.action);
        self.serve().instrument(span).await
    }

    /// Run the server on a new tokio task.
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }

    async fn serve(self) -> Result<()> {
        let Self {
            mut coordinator,
            mut mailbox,
            handle,
            endpoints,
            expiry_check_period,
            ..
        } = self;

        let forwarders: Vec<_> = endpoints
            .into_iter()
            .map(|endpoint| tokio::spawn(forward(endpoint, handle.clone()).in_current_span()))
            .collect();
        drop(handle);

        let mut expiry = tokio::time::interval(expiry_check_period);
        expiry.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("action server started");
        loop {
            tokio::select! {
                cmd = mailbox.recv() => {
                    let Some(cmd) = cmd else {
                        break;
                    };
                    if coordinator.dispatch(cmd).is_break() {
                        break;
                    }
                }
                _ = expiry.tick() => coordinator.expire_stale(Instant::now()),
            }
        }

        for forwarder in &forwarders {
            forwarder.abort();
        }
        let mut res = Ok(());
        for joined in join_all(forwarders).await {
            match joined {
                Err(e) if e.is_panic() => {
                    error!("endpoint forwarder panicked: {e}");
                    res = Err(Error::Other(format!("endpoint forwarder panicked: {e}")));
                }
                _ => {}
            }
        }
        info!("action server stopped");
        res
    }
}

/// Push every request received on `endpoint` into the server mailbox.
async fn forward<A, E>(mut endpoint: E, server: ActionServerHandle<A>)
where
    A: ActionDescriptor,
    E: RosEndpoint<A>,
{
    loop {
        let (request_id, request) = match endpoint.recv().await {
            Ok(received) => received,
            Err(e) => {
                error!(service = endpoint.service_name(), "endpoint closed: {e}");
                return;
            }
        };
        debug!(service = endpoint.service_name(), %request_id, "request received");
        if server.submit_request(request_id, request).is_err() {
            return;
        }
    }
}
