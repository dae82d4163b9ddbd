//! The course publishing and revision-approval workflow engine.
//!
//! Two cooperating components own the lifecycle:
//!
//! - [`CourseRegistry`] — the canonical course record: creation, direct
//!   moderation (approve/reject), and catalog queries.
//! - [`RevisionManager`] — proposed edits against existing courses:
//!   resolution of the effective view, merge-on-approve, and
//!   discard-on-reject.
//!
//! [`CourseWorkflow`] bundles both behind the external surface callers use.
//! Persistence and media upload are boundary traits ([`CourseStore`],
//! [`MediaStore`]) with Postgres/local-disk production implementations and
//! in-memory counterparts for tests and embedding. Workflow outcomes are
//! published fire-and-forget on a [`courseflow_events::EventBus`].

pub mod error;
pub mod listing;
pub mod media;
pub mod registry;
pub mod resolve;
pub mod revision;
pub mod store;
pub mod workflow;

pub use error::{WorkflowError, WorkflowResult};
pub use media::{LocalMediaStore, MediaError, MediaKind, MediaStore};
pub use registry::CourseRegistry;
pub use resolve::EffectiveCourse;
pub use revision::{ProposedEdit, RevisionManager};
pub use store::{CourseStore, MemoryCourseStore, PgCourseStore, StoreError};
pub use workflow::CourseWorkflow;
