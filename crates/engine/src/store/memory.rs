//! In-memory implementation of the persistence boundary.
//!
//! Backs the engine's test suite and lets embedders run the workflow
//! without a database. Semantics mirror [`PgCourseStore`]: sequential id
//! assignment, the same ordering rules, and merge-on-approve applied under
//! one write lock so readers never observe a half-merged course.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use courseflow_core::search::{matches_any, normalize_query};
use courseflow_core::status::CourseStatus;
use courseflow_core::types::{DbId, Timestamp};
use courseflow_db::models::course::{Course, CreateCourse};
use courseflow_db::models::course_update::{CourseOverlay, CourseUpdate};

use crate::resolve;

use super::{CourseStore, StoreError};

#[derive(Default)]
struct State {
    courses: BTreeMap<DbId, Course>,
    updates: BTreeMap<DbId, CourseUpdate>,
    next_course_id: DbId,
    next_update_id: DbId,
}

/// [`CourseStore`] over plain in-process maps behind a `tokio` RwLock.
#[derive(Default)]
pub struct MemoryCourseStore {
    inner: RwLock<State>,
}

impl MemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_most_recently_updated(courses: &mut Vec<Course>) {
    courses.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
}

fn pending_for_course(state: &State, course_id: DbId) -> Option<DbId> {
    state
        .updates
        .values()
        .filter(|u| u.course_id == course_id && u.status_id == CourseStatus::Pending.id())
        .max_by_key(|u| (u.submitted_at, u.id))
        .map(|u| u.id)
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn create_course(
        &self,
        input: &CreateCourse,
        now: Timestamp,
    ) -> Result<Course, StoreError> {
        let mut state = self.inner.write().await;
        state.next_course_id += 1;
        let course = Course {
            id: state.next_course_id,
            title: input.title.clone(),
            description: input.description.clone(),
            image_ref: input.image_ref.clone(),
            price: input.price,
            video_ref: input.video_ref.clone(),
            instructor_id: input.instructor_id,
            instructor_name: input.instructor_name.clone(),
            category_id: input.category_id,
            category_name: input.category_name.clone(),
            status_id: CourseStatus::Pending.id(),
            is_archived: false,
            created_at: now,
            updated_at: now,
            approved_at: None,
        };
        state.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn course(&self, id: DbId) -> Result<Option<Course>, StoreError> {
        let state = self.inner.read().await;
        Ok(state.courses.get(&id).cloned())
    }

    async fn set_course_status(
        &self,
        id: DbId,
        status: CourseStatus,
        now: Timestamp,
    ) -> Result<bool, StoreError> {
        let mut state = self.inner.write().await;
        let Some(course) = state.courses.get_mut(&id) else {
            return Ok(false);
        };
        course.status_id = status.id();
        course.updated_at = now;
        if status == CourseStatus::Approved {
            course.approved_at = Some(now);
        }
        Ok(true)
    }

    async fn courses_by_status(
        &self,
        statuses: &[CourseStatus],
    ) -> Result<Vec<Course>, StoreError> {
        let ids: Vec<i16> = statuses.iter().map(|s| s.id()).collect();
        let state = self.inner.read().await;
        let mut courses: Vec<Course> = state
            .courses
            .values()
            .filter(|c| ids.contains(&c.status_id))
            .cloned()
            .collect();
        sort_most_recently_updated(&mut courses);
        Ok(courses)
    }

    async fn courses_by_instructor(
        &self,
        instructor_id: DbId,
    ) -> Result<Vec<Course>, StoreError> {
        let state = self.inner.read().await;
        let mut courses: Vec<Course> = state
            .courses
            .values()
            .filter(|c| c.instructor_id == instructor_id)
            .cloned()
            .collect();
        sort_most_recently_updated(&mut courses);
        Ok(courses)
    }

    async fn count_courses_by_instructor(&self, instructor_id: DbId) -> Result<i64, StoreError> {
        let state = self.inner.read().await;
        Ok(state
            .courses
            .values()
            .filter(|c| c.instructor_id == instructor_id)
            .count() as i64)
    }

    async fn search_courses(&self, term: &str) -> Result<Vec<Course>, StoreError> {
        let Some(query) = normalize_query(term) else {
            return Ok(Vec::new());
        };
        let state = self.inner.read().await;
        Ok(state
            .courses
            .values()
            .filter(|c| matches_any(&query, c.searchable_fields()))
            .cloned()
            .collect())
    }

    async fn put_pending_update(
        &self,
        course_id: DbId,
        overlay: &CourseOverlay,
        now: Timestamp,
    ) -> Result<CourseUpdate, StoreError> {
        let mut state = self.inner.write().await;
        state.updates.retain(|_, u| {
            !(u.course_id == course_id && u.status_id == CourseStatus::Pending.id())
        });
        state.next_update_id += 1;
        let update = CourseUpdate {
            id: state.next_update_id,
            course_id,
            title: overlay.title.clone(),
            description: overlay.description.clone(),
            image_ref: overlay.image_ref.clone(),
            price: overlay.price,
            video_ref: overlay.video_ref.clone(),
            status_id: CourseStatus::Pending.id(),
            submitted_at: now,
        };
        state.updates.insert(update.id, update.clone());
        Ok(update)
    }

    async fn latest_qualifying_update(
        &self,
        course_id: DbId,
    ) -> Result<Option<CourseUpdate>, StoreError> {
        let state = self.inner.read().await;
        let candidates: Vec<&CourseUpdate> = state
            .updates
            .values()
            .filter(|u| u.course_id == course_id)
            .collect();
        Ok(resolve::latest_qualifying(candidates).cloned())
    }

    async fn pending_update(&self, course_id: DbId) -> Result<Option<CourseUpdate>, StoreError> {
        let state = self.inner.read().await;
        Ok(pending_for_course(&state, course_id).and_then(|id| state.updates.get(&id).cloned()))
    }

    async fn reject_pending_update(&self, course_id: DbId) -> Result<bool, StoreError> {
        let mut state = self.inner.write().await;
        let mut any = false;
        for update in state.updates.values_mut() {
            if update.course_id == course_id && update.status_id == CourseStatus::Pending.id() {
                update.status_id = CourseStatus::Rejected.id();
                any = true;
            }
        }
        Ok(any)
    }

    async fn merge_pending_update(
        &self,
        course_id: DbId,
        now: Timestamp,
    ) -> Result<bool, StoreError> {
        let mut state = self.inner.write().await;

        // Re-checked under the write lock: this is the compare-and-swap.
        let Some(update_id) = pending_for_course(&state, course_id) else {
            return Ok(false);
        };
        if !state.courses.contains_key(&course_id) {
            return Ok(false);
        }

        let update = state.updates.remove(&update_id).map(|mut u| {
            u.status_id = CourseStatus::Approved.id();
            u
        });
        let Some(update) = update else {
            return Ok(false);
        };

        let Some(course) = state.courses.get_mut(&course_id) else {
            return Ok(false);
        };
        course.apply_overlay(&update.overlay());
        course.status_id = CourseStatus::Approved.id();
        course.is_archived = false;
        course.updated_at = now;
        Ok(true)
    }

    async fn pending_updates_by_instructor(
        &self,
        instructor_id: DbId,
    ) -> Result<Vec<CourseUpdate>, StoreError> {
        let state = self.inner.read().await;
        let mut updates: Vec<CourseUpdate> = state
            .updates
            .values()
            .filter(|u| {
                u.status_id == CourseStatus::Pending.id()
                    && state
                        .courses
                        .get(&u.course_id)
                        .is_some_and(|c| c.instructor_id == instructor_id && !c.is_archived)
            })
            .cloned()
            .collect();
        updates.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));
        Ok(updates)
    }
}
