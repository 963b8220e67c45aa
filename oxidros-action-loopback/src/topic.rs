//! In-process topics.

use oxidros_action_core::{Error, Profile, Result, RosPublisher};
use parking_lot::Mutex;
use std::{collections::VecDeque, sync::Arc, time::Duration};

pub(crate) type Topic<T> = Arc<Mutex<TopicState<T>>>;

pub(crate) struct TopicState<T> {
    /// Samples kept for late subscribers. Zero for volatile topics.
    cache_depth: usize,
    history: VecDeque<T>,
    subscribers: Vec<flume::Sender<T>>,
}

impl<T: Clone> TopicState<T> {
    pub(crate) fn new() -> Self {
        Self {
            cache_depth: 0,
            history: VecDeque::new(),
            subscribers: Vec::new(),
        }
    }

    fn publish(&mut self, msg: &T) {
        if self.cache_depth > 0 {
            if self.history.len() == self.cache_depth {
                self.history.pop_front();
            }
            self.history.push_back(msg.clone());
        }
        self.subscribers.retain(|tx| tx.send(msg.clone()).is_ok());
    }
}

/// Topic publisher.
///
/// With a transient-local profile, the last `depth` samples are retained and replayed
/// to every new subscriber.
pub struct Publisher<T> {
    topic_name: String,
    topic: Topic<T>,
}

impl<T: Clone + Send + Sync + 'static> Publisher<T> {
    pub(crate) fn new(topic_name: &str, topic: Topic<T>, qos: &Profile) -> Self {
        {
            let mut state = topic.lock();
            state.cache_depth = if qos.is_transient_local() {
                qos.effective_depth()
            } else {
                0
            };
            while state.history.len() > state.cache_depth {
                state.history.pop_front();
            }
        }
        Self {
            topic_name: topic_name.to_string(),
            topic,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> RosPublisher<T> for Publisher<T> {
    fn topic_name(&self) -> &str {
        &self.topic_name
    }

    fn send(&self, msg: &T) -> Result<()> {
        self.topic.lock().publish(msg);
        Ok(())
    }
}

/// Topic subscriber.
///
/// # Example
///
/// ```ignore
/// let mut status = transport.create_subscriber::<GoalStatusArray>("fib/_action/status")?;
/// let snapshot = status.recv().await?;
/// ```
pub struct Subscriber<T> {
    topic_name: String,
    receiver: flume::Receiver<T>,
}

impl<T: Clone + Send + 'static> Subscriber<T> {
    pub(crate) fn new(topic_name: &str, topic: &Topic<T>) -> Self {
        let (tx, receiver) = flume::unbounded();
        let mut state = topic.lock();
        for msg in &state.history {
            let _ = tx.send(msg.clone());
        }
        state.subscribers.push(tx);
        Self {
            topic_name: topic_name.to_string(),
            receiver,
        }
    }

    pub fn topic_name(&self) -> &str {
        &self.topic_name
    }

    /// Receive a message asynchronously.
    pub async fn recv(&mut self) -> Result<T> {
        self.receiver
            .recv_async()
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    /// Receive a message, giving up after `timeout`.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Result<T> {
        match tokio::time::timeout(timeout, self.recv()).await {
            Ok(v) => v,
            Err(_) => Err(Error::Timeout),
        }
    }

    /// Try to receive a message without blocking.
    ///
    /// Returns `None` if no message is available.
    pub fn try_recv(&mut self) -> Result<Option<T>> {
        match self.receiver.try_recv() {
            Ok(msg) => Ok(Some(msg)),
            Err(flume::TryRecvError::Empty) => Ok(None),
            Err(flume::TryRecvError::Disconnected) => Err(Error::ChannelClosed),
        }
    }

    /// Drain everything received so far and return the most recent message.
    pub fn latest(&mut self) -> Result<Option<T>> {
        let mut last = None;
        while let Some(msg) = self.try_recv()? {
            last = Some(msg);
        }
        Ok(last)
    }
}
