//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`CourseEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use courseflow_core::types::DbId;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// A new course was submitted for moderation.
pub const COURSE_SUBMITTED: &str = "course.submitted";
/// A moderator approved a course.
pub const COURSE_APPROVED: &str = "course.approved";
/// A moderator rejected a course.
pub const COURSE_REJECTED: &str = "course.rejected";
/// An instructor proposed a revision to an existing course.
pub const UPDATE_SUBMITTED: &str = "update.submitted";
/// A moderator approved a revision (merge-on-approve completed).
pub const UPDATE_APPROVED: &str = "update.approved";
/// A moderator rejected a revision.
pub const UPDATE_REJECTED: &str = "update.rejected";

// ---------------------------------------------------------------------------
// CourseEvent
// ---------------------------------------------------------------------------

/// A workflow-outcome event.
///
/// Constructed via [`CourseEvent::new`] and enriched with
/// [`with_payload`](CourseEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseEvent {
    /// Dot-separated event name, e.g. `"course.approved"`.
    pub event_type: String,

    /// The affected course.
    pub course_id: DbId,

    /// The instructor who owns the affected course.
    pub instructor_id: DbId,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl CourseEvent {
    /// Create a new event with an empty payload.
    pub fn new(event_type: impl Into<String>, course_id: DbId, instructor_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            course_id,
            instructor_id,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
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
/// independently receive every published [`CourseEvent`].
pub struct EventBus {
    sender: broadcast::Sender<CourseEvent>,
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
    /// the workflow never depends on anyone listening.
    pub fn publish(&self, event: CourseEvent) {
        // Ignore the SendError, it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<CourseEvent> {
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
