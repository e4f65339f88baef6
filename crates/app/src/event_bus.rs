//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use maxbridge_domain::error::BridgeError;
use maxbridge_domain::event::Event;

use crate::ports::EventPublisher;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped). Slow subscribers lag and lose the
/// oldest events rather than blocking adapters.
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), BridgeError>> + Send {
        // Only fails without receivers, which is not an error here.
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maxbridge_domain::characteristic::{Characteristic, CharacteristicValue};
    use maxbridge_domain::event::EventKind;

    fn changed(value: f64) -> Event {
        Event::new(EventKind::CharacteristicChanged {
            serial: "KEQ0523864".to_string(),
            characteristic: Characteristic::CurrentTemperature,
            value: CharacteristicValue::Float(value),
        })
    }

    #[tokio::test]
    async fn should_deliver_event_to_every_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let event = changed(20.5);
        let event_id = event.id;
        bus.publish(event).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap().id, event_id);
        assert_eq!(rx2.recv().await.unwrap().id, event_id);
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        assert!(bus.publish(changed(20.5)).await.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        bus.publish(changed(19.0)).await.unwrap();

        let mut rx = bus.subscribe();
        let later = changed(19.5);
        let later_id = later.id;
        bus.publish(later).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().id, later_id);
    }

    #[tokio::test]
    async fn should_publish_through_shared_bus() {
        let bus = std::sync::Arc::new(InProcessEventBus::new(16));
        let mut rx = bus.subscribe();

        let publisher = std::sync::Arc::clone(&bus);
        publisher.publish(changed(21.0)).await.unwrap();

        assert!(rx.recv().await.is_ok());
    }
}
