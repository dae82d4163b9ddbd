//! Pure domain logic for the course publishing workflow.
//!
//! This crate has no internal dependencies so it can be used by the DB
//! layer, the workflow engine, and any future CLI or worker tooling:
//!
//! - [`status`] — course/update lifecycle statuses and transition rules.
//! - [`search`] — free-text catalog search helpers.
//! - [`hashing`] — content-address digests for media references.
//! - [`types`] — shared scalar type aliases.

pub mod hashing;
pub mod search;
pub mod status;
pub mod types;

pub use status::CourseStatus;
