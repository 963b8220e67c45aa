//! In-process transport for oxidros action servers.
//!
//! Endpoints, clients, publishers and subscribers all live in one
//! [`LoopbackTransport`]. Nothing leaves the process, which makes it suitable for
//! tests, demos, and servers embedded in the same binary as their clients.
//!
//! # Example
//!
//! ```ignore
//! let transport = LoopbackTransport::<Fibonacci>::new();
//! let server = ActionServer::new(transport.clone(), Fibonacci, callbacks, options)?;
//! let client = ActionClient::new(&transport, "fibonacci")?;
//! ```

pub mod client;
pub mod service;
pub mod topic;

pub use client::ActionClient;
pub use service::{Client, Endpoint, PendingReply};
pub use topic::{Publisher, Subscriber};

use oxidros_action_core::{
    ActionDescriptor, ActionReply, ActionTransport, Error, Profile, RequestId, Result,
};
use parking_lot::Mutex;
use std::{any::Any, collections::BTreeMap, sync::Arc};
use tokio::sync::oneshot;
use topic::{Topic, TopicState};
use tracing::{debug, trace};

type RequestSender<A> = flume::Sender<(RequestId, <A as ActionDescriptor>::Request)>;

/// An in-process [`ActionTransport`].
pub struct LoopbackTransport<A: ActionDescriptor> {
    /// Served endpoints by name.
    services: Mutex<BTreeMap<String, RequestSender<A>>>,
    /// Topics by name. Each value is a `Topic<T>` for the type it was created with.
    topics: Mutex<BTreeMap<String, Arc<dyn Any + Send + Sync>>>,
    /// Clients waiting for a response.
    pending: Mutex<BTreeMap<RequestId, oneshot::Sender<ActionReply<A>>>>,
}

impl<A: ActionDescriptor> LoopbackTransport<A> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            services: Mutex::new(BTreeMap::new()),
            topics: Mutex::new(BTreeMap::new()),
            pending: Mutex::new(BTreeMap::new()),
        })
    }

    /// Create a client of `service_name`.
    ///
    /// The service does not need to exist yet; it is looked up on every call.
    pub fn create_client(self: &Arc<Self>, service_name: &str) -> Client<A> {
        Client::new(self.clone(), service_name)
    }

    /// Subscribe to `topic_name`.
    ///
    /// If the topic is published with a transient-local profile, the subscriber
    /// immediately receives the retained samples.
    pub fn create_subscriber<T: Clone + Send + Sync + 'static>(
        &self,
        topic_name: &str,
    ) -> Result<Subscriber<T>> {
        let topic = self.topic::<T>(topic_name)?;
        Ok(Subscriber::new(topic_name, &topic))
    }

    /// Returns true if an endpoint is serving `service_name`.
    pub fn is_service_available(&self, service_name: &str) -> bool {
        self.services
            .lock()
            .get(service_name)
            .is_some_and(|tx| !tx.is_disconnected())
    }

    /// Number of requests still waiting for a response.
    pub fn pending_responses(&self) -> usize {
        self.pending.lock().len()
    }

    fn topic<T: Clone + Send + Sync + 'static>(&self, topic_name: &str) -> Result<Topic<T>> {
        let mut topics = self.topics.lock();
        let entry = topics
            .entry(topic_name.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(TopicState::<T>::new())) as Arc<dyn Any + Send + Sync>
            });
        entry.clone().downcast::<Mutex<TopicState<T>>>().map_err(|_| {
            Error::InvalidConfig(format!(
                "topic '{topic_name}' already exists with another message type"
            ))
        })
    }

    /// Register a request on `service_name` and hand it to the endpoint.
    pub(crate) fn dispatch(
        &self,
        service_name: &str,
        request_id: RequestId,
        request: A::Request,
    ) -> Result<oneshot::Receiver<ActionReply<A>>> {
        let tx = self
            .services
            .lock()
            .get(service_name)
            .cloned()
            .ok_or_else(|| Error::ServiceNotAvailable(service_name.to_string()))?;

        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.lock().insert(request_id, reply_tx);
        if tx.send((request_id, request)).is_err() {
            self.pending.lock().remove(&request_id);
            return Err(Error::ServiceNotAvailable(service_name.to_string()));
        }
        trace!(service = service_name, %request_id, "request dispatched");
        Ok(reply_rx)
    }

    pub(crate) fn forget(&self, request_id: &RequestId) {
        self.pending.lock().remove(request_id);
    }
}

impl<A: ActionDescriptor> ActionTransport<A> for LoopbackTransport<A> {
    type Publisher<T: Clone + Send + Sync + 'static> = Publisher<T>;
    type Endpoint = Endpoint<A>;

    fn create_endpoint(&self, service_name: &str, _qos: Option<Profile>) -> Result<Endpoint<A>> {
        let mut services = self.services.lock();
        if services
            .get(service_name)
            .is_some_and(|tx| !tx.is_disconnected())
        {
            return Err(Error::ServiceExists(service_name.to_string()));
        }
        let (tx, rx) = flume::unbounded();
        services.insert(service_name.to_string(), tx);
        debug!(service = service_name, "endpoint created");
        Ok(Endpoint::new(service_name, rx))
    }

    fn create_publisher<T: Clone + Send + Sync + 'static>(
        &self,
        topic_name: &str,
        qos: Option<Profile>,
    ) -> Result<Publisher<T>> {
        let qos = qos.unwrap_or_default();
        let topic = self.topic::<T>(topic_name)?;
        Ok(Publisher::new(topic_name, topic, &qos))
    }

    fn send_response(&self, request_id: &RequestId, reply: ActionReply<A>) -> Result<()> {
        let tx = self
            .pending
            .lock()
            .remove(request_id)
            .ok_or_else(|| Error::RequestNotFound(request_id.to_string()))?;
        if tx.send(reply).is_err() {
            debug!(%request_id, "client went away before the response");
        }
        Ok(())
    }
}
