//! Event publication to subscriber channels over a broadcast channel.

use tokio::sync::broadcast;

use crate::models::DispatchEvent;

/// Publishes normalized events for the real-time transport to deliver.
///
/// Fire-and-forget by contract: no delivery confirmation, no backpressure
/// signal back into the pipeline. Transport failures are the transport's
/// concern.
#[derive(Clone)]
pub struct EventDispatcher {
    sender: broadcast::Sender<DispatchEvent>,
}

impl EventDispatcher {
    /// Create a dispatcher with the given channel capacity.
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<DispatchEvent>) {
        let (sender, receiver) = broadcast::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Publish an event to every connected receiver.
    ///
    /// A send error only means no receiver is currently attached; it is
    /// logged and swallowed.
    pub fn publish(&self, event: DispatchEvent) {
        let subscription_id = event.subscription_id.clone();
        if self.sender.send(event).is_err() {
            tracing::warn!(
                target: "dispatch",
                subscription_id = %subscription_id,
                "No active receiver for dispatched event"
            );
        }
    }

    /// Attach a new receiver to the channel.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(id: &str) -> DispatchEvent {
        DispatchEvent {
            subscription_id: id.to_string(),
            event_type: "notification".to_string(),
            resource: json!({}),
        }
    }

    #[tokio::test]
    async fn published_events_reach_receivers() {
        let (dispatcher, mut receiver) = EventDispatcher::new(8);

        dispatcher.publish(event("sub-1"));
        dispatcher.publish(event("sub-2"));

        assert_eq!(receiver.recv().await.unwrap().subscription_id, "sub-1");
        assert_eq!(receiver.recv().await.unwrap().subscription_id, "sub-2");
    }

    #[tokio::test]
    async fn publish_without_receiver_does_not_panic() {
        let (dispatcher, receiver) = EventDispatcher::new(8);
        drop(receiver);

        dispatcher.publish(event("sub-1"));
    }
}
