//! Port interfaces for the realtime change feed

use clinica_domain::{ChangeEvent, Topic};
use tokio::sync::broadcast;
use tracing::warn;

/// Publishes confirmed row changes to whoever is watching the row's topic.
///
/// Publishing is fire-and-forget: with no subscribers the event is simply
/// dropped, matching the original transport's semantics.
pub trait ChangePublisher: Send + Sync {
    fn publish(&self, event: ChangeEvent);
}

/// Hands out live streams of a single row's changes.
pub trait ChangeFeed: Send + Sync {
    /// Open a stream for `topic`. The stream's registration is released
    /// when the returned value is dropped.
    fn subscribe(&self, topic: &Topic) -> ChangeStream;
}

/// Runs a cleanup closure exactly once, when dropped.
pub struct SubscriptionGuard {
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionGuard {
    /// Wrap a deregistration closure.
    pub fn new(on_drop: impl FnOnce() + Send + 'static) -> Self {
        Self { on_drop: Some(Box::new(on_drop)) }
    }

    /// A guard that does nothing on drop, for feeds with no registration
    /// state (tests, mostly).
    pub fn noop() -> Self {
        Self { on_drop: None }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(cleanup) = self.on_drop.take() {
            cleanup();
        }
    }
}

/// A live subscription to one topic.
///
/// Field order matters: the receiver must drop before the guard so the
/// deregistration closure observes an accurate subscriber count.
pub struct ChangeStream {
    receiver: broadcast::Receiver<ChangeEvent>,
    _guard: SubscriptionGuard,
}

impl ChangeStream {
    pub fn new(receiver: broadcast::Receiver<ChangeEvent>, guard: SubscriptionGuard) -> Self {
        Self { receiver, _guard: guard }
    }

    /// Wait for the next event.
    ///
    /// A lagged receiver skips to the oldest retained event: viewers
    /// converge on the last write observed rather than stalling. Returns
    /// `None` once the topic's channel is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "change stream lagged; skipping to newest events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
