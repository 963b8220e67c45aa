//! In-process request endpoints and clients.

use crate::LoopbackTransport;
use oxidros_action_core::{
    ActionDescriptor, ActionReply, Error, RequestId, Result, RosEndpoint, msg::UUID_SIZE,
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
    time::Duration,
};
use tokio::sync::oneshot;

/// Server side of a request endpoint.
pub struct Endpoint<A: ActionDescriptor> {
    service_name: String,
    receiver: flume::Receiver<(RequestId, A::Request)>,
}

impl<A: ActionDescriptor> Endpoint<A> {
    pub(crate) fn new(service_name: &str, receiver: flume::Receiver<(RequestId, A::Request)>) -> Self {
        Self {
            service_name: service_name.to_string(),
            receiver,
        }
    }
}

impl<A: ActionDescriptor> RosEndpoint<A> for Endpoint<A> {
    fn service_name(&self) -> &str {
        &self.service_name
    }

    async fn recv(&mut self) -> Result<(RequestId, A::Request)> {
        self.receiver
            .recv_async()
            .await
            .map_err(|_| Error::ChannelClosed)
    }
}

/// Client of one request endpoint.
///
/// Every client has its own GID; each call gets the next sequence number, so the
/// [`RequestId`]s of one client never collide.
pub struct Client<A: ActionDescriptor> {
    transport: Arc<LoopbackTransport<A>>,
    service_name: String,
    gid: [u8; UUID_SIZE],
    sequence_number: AtomicI64,
}

impl<A: ActionDescriptor> Client<A> {
    pub(crate) fn new(transport: Arc<LoopbackTransport<A>>, service_name: &str) -> Self {
        Self {
            transport,
            service_name: service_name.to_string(),
            gid: *uuid::Uuid::new_v4().as_bytes(),
            sequence_number: AtomicI64::new(0),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn gid(&self) -> &[u8; UUID_SIZE] {
        &self.gid
    }

    pub fn is_service_available(&self) -> bool {
        self.transport.is_service_available(&self.service_name)
    }

    /// Send a request. The reply is awaited through the returned [`PendingReply`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceNotAvailable`] if nothing serves the endpoint.
    pub fn call(&self, request: A::Request) -> Result<PendingReply<A>> {
        let seq = self.sequence_number.fetch_add(1, Ordering::AcqRel);
        let request_id = RequestId::new(self.gid, seq);
        let receiver = self
            .transport
            .dispatch(&self.service_name, request_id, request)?;
        Ok(PendingReply {
            transport: self.transport.clone(),
            request_id,
            receiver,
        })
    }
}

/// A reply that may not have arrived yet.
///
/// Dropping it tells the transport nobody waits for the reply anymore.
pub struct PendingReply<A: ActionDescriptor> {
    transport: Arc<LoopbackTransport<A>>,
    request_id: RequestId,
    receiver: oneshot::Receiver<ActionReply<A>>,
}

impl<A: ActionDescriptor> PendingReply<A> {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Wait for the reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the transport dropped the request.
    pub async fn recv(mut self) -> Result<ActionReply<A>> {
        (&mut self.receiver).await.map_err(|_| Error::ChannelClosed)
    }

    /// Wait for the reply, giving up after `timeout`.
    pub async fn recv_timeout(self, timeout: Duration) -> Result<ActionReply<A>> {
        match tokio::time::timeout(timeout, self.recv()).await {
            Ok(v) => v,
            Err(_) => Err(Error::Timeout),
        }
    }

    /// Take the reply if it already arrived.
    pub fn try_recv(&mut self) -> Result<Option<ActionReply<A>>> {
        match self.receiver.try_recv() {
            Ok(reply) => Ok(Some(reply)),
            Err(oneshot::error::TryRecvError::Empty) => Ok(None),
            Err(oneshot::error::TryRecvError::Closed) => Err(Error::ChannelClosed),
        }
    }
}

impl<A: ActionDescriptor> Drop for PendingReply<A> {
    fn drop(&mut self) {
        self.transport.forget(&self.request_id);
    }
}
