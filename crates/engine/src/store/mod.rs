//! The persistence boundary.
//!
//! [`CourseStore`] is the record-level storage contract the engine
//! composes its decisions over. The engine never reaches a database
//! directly: [`PgCourseStore`] delegates to the `courseflow-db`
//! repositories, and [`MemoryCourseStore`] provides the same semantics in
//! process for tests and embedders.
//!
//! The one non-obvious obligation on implementors is
//! [`merge_pending_update`](CourseStore::merge_pending_update): the
//! overlay-apply, status flip, archive clear, timestamp stamp, and
//! update-row removal must land as a single atomic unit, guarded by a
//! compare-and-swap on the update still being Pending. Two concurrent
//! approvals must yield exactly one `true`.

use async_trait::async_trait;

use courseflow_core::status::CourseStatus;
use courseflow_core::types::{DbId, Timestamp};
use courseflow_db::models::course::{Course, CreateCourse};
use courseflow_db::models::course_update::{CourseOverlay, CourseUpdate};

mod memory;
mod postgres;

pub use memory::MemoryCourseStore;
pub use postgres::PgCourseStore;

/// A failure at the persistence boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Record-level storage operations for courses and their updates.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Insert a new course in Pending status.
    async fn create_course(
        &self,
        input: &CreateCourse,
        now: Timestamp,
    ) -> Result<Course, StoreError>;

    /// Fetch a course by id.
    async fn course(&self, id: DbId) -> Result<Option<Course>, StoreError>;

    /// Flip a course's moderation status, stamping `updated_at` (and
    /// `approved_at` for approvals). `false` if the course does not exist.
    async fn set_course_status(
        &self,
        id: DbId,
        status: CourseStatus,
        now: Timestamp,
    ) -> Result<bool, StoreError>;

    /// Courses whose status is in the given set, most recently updated first.
    async fn courses_by_status(
        &self,
        statuses: &[CourseStatus],
    ) -> Result<Vec<Course>, StoreError>;

    /// All of an instructor's courses, most recently updated first.
    async fn courses_by_instructor(&self, instructor_id: DbId)
        -> Result<Vec<Course>, StoreError>;

    /// Count of an instructor's courses.
    async fn count_courses_by_instructor(&self, instructor_id: DbId) -> Result<i64, StoreError>;

    /// Case-insensitive substring search across title, description,
    /// category name, and instructor name, in storage order.
    async fn search_courses(&self, term: &str) -> Result<Vec<Course>, StoreError>;

    /// Insert a pending update for a course, superseding (removing) any
    /// prior pending update in the same atomic operation.
    async fn put_pending_update(
        &self,
        course_id: DbId,
        overlay: &CourseOverlay,
        now: Timestamp,
    ) -> Result<CourseUpdate, StoreError>;

    /// The latest update in {Pending, Approved} for a course, tie-broken by
    /// `submitted_at` then `id` descending.
    async fn latest_qualifying_update(
        &self,
        course_id: DbId,
    ) -> Result<Option<CourseUpdate>, StoreError>;

    /// The latest pending update for a course, if any.
    async fn pending_update(&self, course_id: DbId) -> Result<Option<CourseUpdate>, StoreError>;

    /// Flip a course's pending update(s) to Rejected, leaving the rows in
    /// place for history. `false` if nothing was pending.
    async fn reject_pending_update(&self, course_id: DbId) -> Result<bool, StoreError>;

    /// Merge the course's pending update into the base course and retire
    /// the update row, atomically with a still-Pending compare-and-swap.
    /// `false` if nothing was pending, the course is missing, or the race
    /// was lost.
    async fn merge_pending_update(
        &self,
        course_id: DbId,
        now: Timestamp,
    ) -> Result<bool, StoreError>;

    /// An instructor's pending updates whose parent course is not archived,
    /// most recently submitted first.
    async fn pending_updates_by_instructor(
        &self,
        instructor_id: DbId,
    ) -> Result<Vec<CourseUpdate>, StoreError>;
}
