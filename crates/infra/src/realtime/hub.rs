//! In-process change hub backed by per-topic broadcast channels
//!
//! Implements both realtime ports: services publish confirmed row changes
//! and viewers subscribe to a single row's topic. Channels are created on
//! first subscribe and removed when the last subscriber drops, so an idle
//! hub holds no state.

use std::sync::Arc;

use clinica_core::realtime::ports::{ChangeFeed, ChangePublisher, ChangeStream, SubscriptionGuard};
use clinica_domain::{ChangeEvent, Topic};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Per-topic broadcast hub
pub struct ChangeHub {
    channels: Arc<DashMap<String, broadcast::Sender<ChangeEvent>>>,
    capacity: usize,
}

impl ChangeHub {
    /// Create a hub with the default per-topic buffer.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a hub with an explicit per-topic buffer size.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { channels: Arc::new(DashMap::new()), capacity: capacity.max(1) }
    }

    /// Number of live topics, for observability and tests.
    pub fn topic_count(&self) -> usize {
        self.channels.len()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangePublisher for ChangeHub {
    fn publish(&self, event: ChangeEvent) {
        let key = event.topic().key();
        if let Some(sender) = self.channels.get(&key) {
            // Send only fails when every receiver is gone; the topic will
            // be cleaned up by the last guard.
            let delivered = sender.send(event).unwrap_or(0);
            debug!(topic = %key, delivered, "change event published");
        }
    }
}

impl ChangeFeed for ChangeHub {
    fn subscribe(&self, topic: &Topic) -> ChangeStream {
        let key = topic.key();
        let sender = self
            .channels
            .entry(key.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone();
        let receiver = sender.subscribe();
        debug!(topic = %key, subscribers = sender.receiver_count(), "change stream opened");

        let channels = Arc::clone(&self.channels);
        let guard = SubscriptionGuard::new(move || {
            channels.remove_if(&key, |_, sender| sender.receiver_count() == 0);
        });
        ChangeStream::new(receiver, guard)
    }
}
