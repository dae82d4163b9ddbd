//! Workflow-outcome event infrastructure.
//!
//! The workflow engine emits a [`CourseEvent`] whenever a course or
//! revision changes moderation state. Delivery is fire-and-forget from the
//! engine's perspective: transports (email, webhooks, in-app feeds)
//! subscribe to the [`EventBus`] and are never awaited for correctness.

pub mod bus;

pub use bus::{CourseEvent, EventBus};
