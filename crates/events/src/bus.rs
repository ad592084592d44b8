//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`StudioEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across a session.

use chrono::Utc;
use encore_core::types::{StudioId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A user reached a different level after recalculation.
pub const EVENT_LEVEL_ADVANCED: &str = "level.advanced";

/// The persisted active studio or its roles changed.
pub const EVENT_CONTEXT_CHANGED: &str = "studio.context_changed";

/// A pending invite was accepted.
pub const EVENT_INVITE_ACCEPTED: &str = "invite.accepted";

// ---------------------------------------------------------------------------
// StudioEvent
// ---------------------------------------------------------------------------

/// Something that happened during a session.
///
/// Constructed via [`StudioEvent::new`] and enriched with
/// [`for_user`](StudioEvent::for_user),
/// [`in_studio`](StudioEvent::in_studio) and
/// [`with_payload`](StudioEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioEvent {
    /// Dot-separated event name, e.g. `"level.advanced"`.
    pub event_type: String,

    pub user_id: Option<UserId>,

    pub studio_id: Option<StudioId>,

    /// Event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: Timestamp,
}

impl StudioEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            user_id: None,
            studio_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn for_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn in_studio(mut self, studio_id: impl Into<StudioId>) -> Self {
        self.studio_id = Some(studio_id.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use encore_events::bus::{EventBus, StudioEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(StudioEvent::new("studio.context_changed"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<StudioEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. With no subscribers the event is
    /// dropped.
    pub fn publish(&self, event: StudioEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            StudioEvent::new(EVENT_CONTEXT_CHANGED)
                .for_user("u1")
                .in_studio("s9")
                .with_payload(serde_json::json!({"roles": ["teacher"]})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, EVENT_CONTEXT_CHANGED);
        assert_eq!(received.user_id.as_deref(), Some("u1"));
        assert_eq!(received.studio_id.as_deref(), Some("s9"));
        assert_eq!(received.payload["roles"][0], "teacher");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(StudioEvent::new(EVENT_INVITE_ACCEPTED));

        assert_eq!(rx1.recv().await.unwrap().event_type, EVENT_INVITE_ACCEPTED);
        assert_eq!(rx2.recv().await.unwrap().event_type, EVENT_INVITE_ACCEPTED);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(StudioEvent::new("orphan.event"));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = StudioEvent::new("bare.event");
        assert!(event.user_id.is_none());
        assert!(event.studio_id.is_none());
        assert!(event.payload.is_object());
    }

    #[test]
    fn timestamp_round_trips_through_json() {
        let before = Utc::now();
        let event = StudioEvent::new("stamped.event");
        assert!(event.timestamp >= before);

        let json = serde_json::to_value(&event).unwrap();
        let back: StudioEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.timestamp, event.timestamp);
    }
}
