//! Repository for the `courses` table.

use sqlx::PgPool;

use courseflow_core::search::escape_like;
use courseflow_core::status::CourseStatus;
use courseflow_core::types::{DbId, StatusId, Timestamp};

use crate::models::course::{Course, CreateCourse};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, title, description, image_ref, price, video_ref, \
    instructor_id, instructor_name, category_id, category_name, \
    status_id, is_archived, created_at, updated_at, approved_at";

/// Provides record-level operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course in Pending status, returning the created row.
    ///
    /// `now` stamps both `created_at` and `updated_at` so the engine stays
    /// the single clock for lifecycle timestamps.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCourse,
        now: Timestamp,
    ) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses
                (title, description, image_ref, price, video_ref,
                 instructor_id, instructor_name, category_id, category_name,
                 status_id, is_archived, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, false, $11, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.image_ref)
            .bind(input.price)
            .bind(&input.video_ref)
            .bind(input.instructor_id)
            .bind(&input.instructor_name)
            .bind(input.category_id)
            .bind(&input.category_name)
            .bind(CourseStatus::Pending.id())
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Find a course by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Flip a course's moderation status, stamping `updated_at` and, for
    /// approvals, `approved_at`. Returns `false` if no such course exists.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: CourseStatus,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE courses SET
                status_id = $2,
                updated_at = $3,
                approved_at = CASE WHEN $2::smallint = 2 THEN $3 ELSE approved_at END
             WHERE id = $1",
        )
        .bind(id)
        .bind(status.id())
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List courses whose status is in the given set, most recently updated
    /// first.
    pub async fn list_by_status(
        pool: &PgPool,
        statuses: &[CourseStatus],
    ) -> Result<Vec<Course>, sqlx::Error> {
        let ids: Vec<StatusId> = statuses.iter().map(|s| s.id()).collect();
        let query = format!(
            "SELECT {COLUMNS} FROM courses
             WHERE status_id = ANY($1)
             ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List all of an instructor's courses, most recently updated first.
    pub async fn list_by_instructor(
        pool: &PgPool,
        instructor_id: DbId,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM courses
             WHERE instructor_id = $1
             ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(instructor_id)
            .fetch_all(pool)
            .await
    }

    /// Count an instructor's courses.
    pub async fn count_by_instructor(
        pool: &PgPool,
        instructor_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses WHERE instructor_id = $1")
            .bind(instructor_id)
            .fetch_one(pool)
            .await
    }

    /// Case-insensitive substring search across title, description,
    /// category name, and instructor name. No ranking; storage order.
    pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<Course>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(term));
        let query = format!(
            "SELECT {COLUMNS} FROM courses
             WHERE title ILIKE $1
                OR description ILIKE $1
                OR category_name ILIKE $1
                OR instructor_name ILIKE $1
             ORDER BY id"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(pattern)
            .fetch_all(pool)
            .await
    }
}
