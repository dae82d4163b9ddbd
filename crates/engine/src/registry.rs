//! The Course Registry: canonical course records and direct moderation.
//!
//! The registry owns mutation of `Course` row fields. It never touches
//! `CourseUpdate` rows; proposed revisions belong to the
//! [`RevisionManager`](crate::revision::RevisionManager), which holds the
//! one documented cross-component write (merge-on-approve).

use std::sync::Arc;

use chrono::Utc;

use courseflow_core::search::normalize_query;
use courseflow_core::status::CourseStatus;
use courseflow_core::types::DbId;
use courseflow_db::models::course::{Course, CreateCourse};
use courseflow_events::bus::{COURSE_APPROVED, COURSE_REJECTED};
use courseflow_events::{CourseEvent, EventBus};

use crate::error::WorkflowResult;
use crate::store::CourseStore;

/// Creates, fetches, and directly moderates top-level courses.
pub struct CourseRegistry<S: CourseStore> {
    store: Arc<S>,
    bus: Arc<EventBus>,
}

impl<S: CourseStore> CourseRegistry<S> {
    pub fn new(store: Arc<S>, bus: Arc<EventBus>) -> Self {
        Self { store, bus }
    }

    /// Create a new course in Pending status.
    ///
    /// Required-field validation is delegated to the caller's input layer,
    /// and the submission notification is the caller's responsibility too,
    /// so this operation has no side effect beyond persistence.
    pub async fn create(&self, input: &CreateCourse) -> WorkflowResult<Course> {
        let course = self.store.create_course(input, Utc::now()).await?;
        tracing::info!(
            course_id = course.id,
            instructor_id = course.instructor_id,
            "Course created, awaiting moderation"
        );
        Ok(course)
    }

    /// Fetch the raw base course.
    pub async fn course(&self, id: DbId) -> WorkflowResult<Option<Course>> {
        Ok(self.store.course(id).await?)
    }

    /// Approve a course. Returns `false` if it does not exist or sits in
    /// Rejected status (a rejected course only returns to Approved through
    /// an accepted revision). Re-approving an approved course is an
    /// idempotent re-stamp.
    pub async fn approve(&self, id: DbId) -> WorkflowResult<bool> {
        let Some(course) = self.store.course(id).await? else {
            return Ok(false);
        };
        let Some(status) = course.status() else {
            return Ok(false);
        };
        if !status.can_approve() {
            tracing::warn!(
                course_id = id,
                status = status.as_str(),
                "Refusing to approve a rejected course"
            );
            return Ok(false);
        }

        let changed = self
            .store
            .set_course_status(id, CourseStatus::Approved, Utc::now())
            .await?;
        if changed {
            tracing::info!(course_id = id, decision = "approved", "Course moderated");
            self.bus
                .publish(CourseEvent::new(COURSE_APPROVED, id, course.instructor_id));
        }
        Ok(changed)
    }

    /// Reject a course. Returns `false` only if it does not exist; an
    /// already-live course can be pulled.
    pub async fn reject(&self, id: DbId) -> WorkflowResult<bool> {
        let Some(course) = self.store.course(id).await? else {
            return Ok(false);
        };

        let changed = self
            .store
            .set_course_status(id, CourseStatus::Rejected, Utc::now())
            .await?;
        if changed {
            tracing::info!(course_id = id, decision = "rejected", "Course moderated");
            self.bus
                .publish(CourseEvent::new(COURSE_REJECTED, id, course.instructor_id));
        }
        Ok(changed)
    }

    /// List courses whose base status is in the given set.
    pub async fn by_status(&self, statuses: &[CourseStatus]) -> WorkflowResult<Vec<Course>> {
        Ok(self.store.courses_by_status(statuses).await?)
    }

    /// All of an instructor's courses.
    pub async fn by_instructor(&self, instructor_id: DbId) -> WorkflowResult<Vec<Course>> {
        Ok(self.store.courses_by_instructor(instructor_id).await?)
    }

    /// Count of an instructor's courses.
    pub async fn count_by_instructor(&self, instructor_id: DbId) -> WorkflowResult<i64> {
        Ok(self.store.count_courses_by_instructor(instructor_id).await?)
    }

    /// Free-text search across title, description, category name, and
    /// instructor name. Blank queries match nothing.
    pub async fn search(&self, query: &str) -> WorkflowResult<Vec<Course>> {
        let Some(query) = normalize_query(query) else {
            return Ok(Vec::new());
        };
        Ok(self.store.search_courses(&query).await?)
    }
}
