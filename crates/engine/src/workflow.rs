//! The external surface of the workflow engine.
//!
//! [`CourseWorkflow`] bundles the [`CourseRegistry`] and
//! [`RevisionManager`] over one shared store and event bus, dispatches
//! moderator decisions to whichever component owns the affected record,
//! and assembles the two aggregate listings.

use std::collections::HashMap;
use std::sync::Arc;

use courseflow_core::status::{CourseStatus, ALL_STATUSES};
use courseflow_core::types::DbId;
use courseflow_db::models::course::{Course, CreateCourse};
use courseflow_events::bus::COURSE_SUBMITTED;
use courseflow_events::{CourseEvent, EventBus};

use crate::error::WorkflowResult;
use crate::listing;
use crate::media::MediaStore;
use crate::registry::CourseRegistry;
use crate::resolve::{self, EffectiveCourse};
use crate::revision::{ProposedEdit, RevisionManager};
use crate::store::CourseStore;

/// The course publishing workflow engine.
pub struct CourseWorkflow<S: CourseStore, M: MediaStore> {
    store: Arc<S>,
    bus: Arc<EventBus>,
    registry: CourseRegistry<S>,
    revisions: RevisionManager<S, M>,
}

impl<S: CourseStore, M: MediaStore> CourseWorkflow<S, M> {
    pub fn new(store: Arc<S>, media: Arc<M>, bus: Arc<EventBus>) -> Self {
        Self {
            registry: CourseRegistry::new(Arc::clone(&store), Arc::clone(&bus)),
            revisions: RevisionManager::new(Arc::clone(&store), media, Arc::clone(&bus)),
            store,
            bus,
        }
    }

    /// The registry component, for its course-level query helpers.
    pub fn registry(&self) -> &CourseRegistry<S> {
        &self.registry
    }

    /// The revision-manager component.
    pub fn revisions(&self) -> &RevisionManager<S, M> {
        &self.revisions
    }

    /// Create a new course and emit the submission event on the
    /// instructor's behalf.
    pub async fn create_course(&self, input: &CreateCourse) -> WorkflowResult<Course> {
        let course = self.registry.create(input).await?;
        self.bus.publish(CourseEvent::new(
            COURSE_SUBMITTED,
            course.id,
            course.instructor_id,
        ));
        Ok(course)
    }

    /// Propose an edit against an existing course.
    pub async fn propose_update(&self, course_id: DbId, edit: ProposedEdit) -> WorkflowResult<bool> {
        self.revisions.propose(course_id, edit).await
    }

    /// The course overlaid with its latest qualifying revision, or `None`
    /// if no such course exists.
    pub async fn get_effective_course(
        &self,
        course_id: DbId,
    ) -> WorkflowResult<Option<EffectiveCourse>> {
        self.revisions.resolve(course_id).await
    }

    /// Moderator decision on a top-level course.
    pub async fn approve_course(&self, course_id: DbId) -> WorkflowResult<bool> {
        self.registry.approve(course_id).await
    }

    /// Moderator decision on a top-level course.
    pub async fn reject_course(&self, course_id: DbId) -> WorkflowResult<bool> {
        self.registry.reject(course_id).await
    }

    /// Moderator decision on a course's pending revision.
    pub async fn approve_update(&self, course_id: DbId) -> WorkflowResult<bool> {
        self.revisions.approve(course_id).await
    }

    /// Moderator decision on a course's pending revision.
    pub async fn reject_update(&self, course_id: DbId) -> WorkflowResult<bool> {
        self.revisions.reject(course_id).await
    }

    /// The catalog/admin listing: every course overlaid with its latest
    /// qualifying update, rejected-without-fix courses excluded,
    /// Pending-resolved first then most recently updated first.
    ///
    /// `filter`, when given, keeps only rows whose *resolved* status is in
    /// the set.
    pub async fn list_catalog(
        &self,
        filter: Option<&[CourseStatus]>,
    ) -> WorkflowResult<Vec<EffectiveCourse>> {
        let courses = self.store.courses_by_status(ALL_STATUSES).await?;

        let mut rows = Vec::with_capacity(courses.len());
        for course in &courses {
            let latest = self.store.latest_qualifying_update(course.id).await?;
            let Some(row) = listing::catalog_entry(course, latest.as_ref()) else {
                continue;
            };
            if filter.is_some_and(|statuses| !statuses.contains(&row.status)) {
                continue;
            }
            rows.push(row);
        }

        listing::sort_pending_first(&mut rows);
        Ok(rows)
    }

    /// The per-instructor listing: the instructor's base courses rendered
    /// with their own fields, plus each pending update as a distinct
    /// pseudo-row carrying the update's own id and `is_update = true`.
    pub async fn list_by_instructor(
        &self,
        instructor_id: DbId,
    ) -> WorkflowResult<Vec<EffectiveCourse>> {
        let courses = self.store.courses_by_instructor(instructor_id).await?;
        let by_id: HashMap<DbId, &Course> = courses.iter().map(|c| (c.id, c)).collect();

        let mut rows: Vec<EffectiveCourse> =
            courses.iter().map(|c| resolve::effective(c, None)).collect();

        for update in self.store.pending_updates_by_instructor(instructor_id).await? {
            if let Some(course) = by_id.get(&update.course_id) {
                rows.push(resolve::instructor_update_row(course, &update));
            }
        }

        listing::sort_pending_first(&mut rows);
        Ok(rows)
    }

    /// Free-text catalog search over base courses.
    pub async fn search_catalog(&self, query: &str) -> WorkflowResult<Vec<Course>> {
        self.registry.search(query).await
    }
}
