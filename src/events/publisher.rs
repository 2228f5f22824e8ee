//! Broadcast-backed event publisher, one channel per event kind.

use tokio::sync::broadcast;

/// Fan-out publisher for one kind of event.
///
/// Backed by a broadcast channel: every subscriber sees every event published
/// after it subscribed. Publishing with no subscribers is acceptable and not
/// an error; unobserved pools rely on exactly this to skip work.
#[derive(Debug, Clone)]
pub struct EventPublisher<T: Clone> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone> EventPublisher<T> {
    /// Create a new publisher with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: T) {
        // A send error only means there are no subscribers right now; events
        // for unobserved consumers are intentionally droppable.
        match self.sender.send(event) {
            Ok(_) => {}
            Err(broadcast::error::SendError(_)) => {}
        }
    }

    /// Subscribe to events published from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone> Default for EventPublisher<T> {
    fn default() -> Self {
        Self::new(256)
    }
}
