//! Postgres implementation of the persistence boundary.

use async_trait::async_trait;

use courseflow_core::status::CourseStatus;
use courseflow_core::types::{DbId, Timestamp};
use courseflow_db::models::course::{Course, CreateCourse};
use courseflow_db::models::course_update::{CourseOverlay, CourseUpdate};
use courseflow_db::repositories::{CourseRepo, CourseUpdateRepo};
use courseflow_db::{create_pool, DbPool};

use super::{CourseStore, StoreError};

/// [`CourseStore`] backed by the `courseflow-db` repositories.
pub struct PgCourseStore {
    pool: DbPool,
}

impl PgCourseStore {
    /// Wrap an existing connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Connect to a database URL with the default pool settings.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(create_pool(database_url).await?))
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl CourseStore for PgCourseStore {
    async fn create_course(
        &self,
        input: &CreateCourse,
        now: Timestamp,
    ) -> Result<Course, StoreError> {
        Ok(CourseRepo::create(&self.pool, input, now).await?)
    }

    async fn course(&self, id: DbId) -> Result<Option<Course>, StoreError> {
        Ok(CourseRepo::find_by_id(&self.pool, id).await?)
    }

    async fn set_course_status(
        &self,
        id: DbId,
        status: CourseStatus,
        now: Timestamp,
    ) -> Result<bool, StoreError> {
        Ok(CourseRepo::set_status(&self.pool, id, status, now).await?)
    }

    async fn courses_by_status(
        &self,
        statuses: &[CourseStatus],
    ) -> Result<Vec<Course>, StoreError> {
        Ok(CourseRepo::list_by_status(&self.pool, statuses).await?)
    }

    async fn courses_by_instructor(
        &self,
        instructor_id: DbId,
    ) -> Result<Vec<Course>, StoreError> {
        Ok(CourseRepo::list_by_instructor(&self.pool, instructor_id).await?)
    }

    async fn count_courses_by_instructor(&self, instructor_id: DbId) -> Result<i64, StoreError> {
        Ok(CourseRepo::count_by_instructor(&self.pool, instructor_id).await?)
    }

    async fn search_courses(&self, term: &str) -> Result<Vec<Course>, StoreError> {
        Ok(CourseRepo::search(&self.pool, term).await?)
    }

    async fn put_pending_update(
        &self,
        course_id: DbId,
        overlay: &CourseOverlay,
        now: Timestamp,
    ) -> Result<CourseUpdate, StoreError> {
        Ok(CourseUpdateRepo::create_superseding(&self.pool, course_id, overlay, now).await?)
    }

    async fn latest_qualifying_update(
        &self,
        course_id: DbId,
    ) -> Result<Option<CourseUpdate>, StoreError> {
        Ok(CourseUpdateRepo::latest_qualifying(&self.pool, course_id).await?)
    }

    async fn pending_update(&self, course_id: DbId) -> Result<Option<CourseUpdate>, StoreError> {
        Ok(CourseUpdateRepo::find_pending(&self.pool, course_id).await?)
    }

    async fn reject_pending_update(&self, course_id: DbId) -> Result<bool, StoreError> {
        Ok(CourseUpdateRepo::reject_pending(&self.pool, course_id).await?)
    }

    async fn merge_pending_update(
        &self,
        course_id: DbId,
        now: Timestamp,
    ) -> Result<bool, StoreError> {
        Ok(CourseUpdateRepo::approve_and_merge(&self.pool, course_id, now).await?)
    }

    async fn pending_updates_by_instructor(
        &self,
        instructor_id: DbId,
    ) -> Result<Vec<CourseUpdate>, StoreError> {
        Ok(CourseUpdateRepo::pending_by_instructor(&self.pool, instructor_id).await?)
    }
}
