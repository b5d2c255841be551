//! Event types for the MetaDump client event system
//!
//! Provides the shared event definitions and EventBus used by the results
//! orchestrator so that pages/UIs can observe session progress without being
//! wired into every component.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// MetaDump client event types
///
/// Events are broadcast via [`EventBus`]. Statuses and segment ids travel as
/// plain strings so the enum stays serializable without pulling in the client
/// model types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnnotateEvent {
    /// Session status observed to change between two polls
    SessionStatusChanged {
        /// Session identifier
        session_id: String,
        /// Status before the change
        old_status: String,
        /// Status after the change
        new_status: String,
        /// When the change was observed
        timestamp: DateTime<Utc>,
    },

    /// Session reached the failed state
    SessionFailed {
        /// Session identifier
        session_id: String,
        /// Error text reported by the backend, if any
        error: Option<String>,
        /// When the failure was observed
        timestamp: DateTime<Utc>,
    },

    /// Segment catalog fetched after completion
    CatalogLoaded {
        /// Session identifier
        session_id: String,
        /// Ordered segment ids, sentinel included if the backend lists it
        segments: Vec<String>,
        /// When the catalog was loaded
        timestamp: DateTime<Utc>,
    },

    /// Per-segment metadata join committed for the active selection
    SegmentInfoCommitted {
        /// Session identifier
        session_id: String,
        /// Segment the committed info belongs to
        segment: String,
        /// When the join committed
        timestamp: DateTime<Utc>,
    },

    /// A render scene (structure + directive set) was handed to the viewer
    ScenePublished {
        /// Session identifier
        session_id: String,
        /// Number of directives in the scene, one per catalog segment
        directive_count: usize,
        /// When the scene was published
        timestamp: DateTime<Utc>,
    },

    /// A metadata export artifact was produced
    ExportCompleted {
        /// Session identifier
        session_id: String,
        /// Artifact file name
        file_name: String,
        /// When the export completed
        timestamp: DateTime<Utc>,
    },
}

/// Central event distribution bus
///
/// Backed by `tokio::broadcast`: non-blocking publish, multiple concurrent
/// subscribers, automatic cleanup when subscribers drop.
///
/// # Examples
///
/// ```
/// use mdump_common::events::{AnnotateEvent, EventBus};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus
///     .emit(AnnotateEvent::SessionStatusChanged {
///         session_id: "abc".to_string(),
///         old_status: "pending".to_string(),
///         new_status: "processing".to_string(),
///         timestamp: chrono::Utc::now(),
///     })
///     .ok();
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AnnotateEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<AnnotateEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` when nobody is listening (callers typically `.ok()` this).
    pub fn emit(
        &self,
        event: AnnotateEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<AnnotateEvent>> {
        self.tx.send(event)
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_subscriber() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        bus.emit(AnnotateEvent::CatalogLoaded {
            session_id: "abc".to_string(),
            segments: vec!["A".to_string(), "B".to_string()],
            timestamp: Utc::now(),
        })
        .unwrap();

        match rx.recv().await.unwrap() {
            AnnotateEvent::CatalogLoaded { segments, .. } => {
                assert_eq!(segments, vec!["A", "B"]);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn emit_without_subscribers_is_an_error() {
        let bus = EventBus::new(10);
        let result = bus.emit(AnnotateEvent::SessionFailed {
            session_id: "abc".to_string(),
            error: Some("timeout".to_string()),
            timestamp: Utc::now(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = AnnotateEvent::ScenePublished {
            session_id: "abc".to_string(),
            directive_count: 3,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ScenePublished");
        assert_eq!(json["directive_count"], 3);
    }
}
