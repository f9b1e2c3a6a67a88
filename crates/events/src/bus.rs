//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`PlatformEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use vellum_core::types::DbId;

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// Event type emitted after a draft commit is merged into history.
pub const COMMIT_MERGED: &str = "commit.merged";

/// A domain event that occurred in the versioning engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"commit.merged"`.
    pub event_type: String,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// The notification published after a successful merge.
    ///
    /// Carries everything a subscriber needs to fan out without a
    /// database round-trip: the merged commit, its project, the owning
    /// workspace, and the acting user.
    pub fn commit_merged(
        commit_id: DbId,
        project_id: DbId,
        workspace_id: DbId,
        actor_user_id: Option<DbId>,
    ) -> Self {
        Self {
            event_type: COMMIT_MERGED.to_string(),
            actor_user_id,
            payload: serde_json::json!({
                "commit_id": commit_id,
                "project_id": project_id,
                "workspace_id": workspace_id,
                "actor_id": actor_user_id,
            }),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`PlatformEvent`].
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// publication never fails and is never awaited on.
    pub fn publish(&self, event: PlatformEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_merged_event_carries_identifiers() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(PlatformEvent::commit_merged(42, 7, 3, Some(11)));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, COMMIT_MERGED);
        assert_eq!(received.actor_user_id, Some(11));
        assert_eq!(received.payload["commit_id"], 42);
        assert_eq!(received.payload["project_id"], 7);
        assert_eq!(received.payload["workspace_id"], 3);
        assert_eq!(received.payload["actor_id"], 11);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(PlatformEvent::commit_merged(1, 2, 3, None));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, COMMIT_MERGED);
        assert_eq!(e2.event_type, COMMIT_MERGED);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers — this must not panic.
        bus.publish(PlatformEvent::commit_merged(1, 2, 3, None));
    }

    #[test]
    fn anonymous_merge_has_null_actor() {
        let event = PlatformEvent::commit_merged(1, 2, 3, None);
        assert!(event.actor_user_id.is_none());
        assert!(event.payload["actor_id"].is_null());
    }
}
