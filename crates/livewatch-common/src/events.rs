use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{Handle, TransitionEvent};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    WentLive(TransitionEvent),
    WentOffline {
        handle: Handle,
    },
    TickCompleted {
        tick_id: String,
        checked: usize,
        live: usize,
        failed: usize,
    },
    TickFailed {
        tick_id: String,
        reason: String,
    },
    Shutdown,
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_transition() -> TransitionEvent {
        TransitionEvent {
            handle: Handle::parse("nova").unwrap(),
            owner_id: "u1".into(),
            owner_name: "Nova".into(),
            group_id: "g1".into(),
            viewer_count: 120,
            category: "Just Chatting".into(),
            title: "hi".into(),
            observed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::WentLive(sample_transition()));

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, Event::WentLive(ref t) if t.handle.as_str() == "nova"));
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(Event::Shutdown);

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert!(matches!(e1, Event::Shutdown));
        assert!(matches!(e2, Event::Shutdown));
    }

    #[tokio::test]
    async fn tick_events_keep_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::TickFailed {
            tick_id: "aa".into(),
            reason: "503".into(),
        });
        bus.publish(Event::TickCompleted {
            tick_id: "bb".into(),
            checked: 3,
            live: 1,
            failed: 0,
        });

        let e1 = rx.recv().await.unwrap();
        assert!(matches!(e1, Event::TickFailed { ref tick_id, .. } if tick_id == "aa"));

        let e2 = rx.recv().await.unwrap();
        assert!(matches!(e2, Event::TickCompleted { checked: 3, live: 1, .. }));
    }

    #[test]
    fn publish_returns_zero_with_no_subscribers() {
        let bus = EventBus::new(16);
        let count = bus.publish(Event::Shutdown);
        assert_eq!(count, 0);
    }

    #[test]
    fn unknown_event_deserializes() {
        let json = r#"{"type":"SomeNewEventWeNeverHeardOf","data":null}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert!(matches!(event, Event::Unknown));
    }
}
