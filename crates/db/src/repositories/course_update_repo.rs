//! Repository for the `course_updates` table, including the transactional
//! merge-on-approve path.

use sqlx::PgPool;

use courseflow_core::status::CourseStatus;
use courseflow_core::types::{DbId, Timestamp};

use crate::models::course::Course;
use crate::models::course_update::{CourseOverlay, CourseUpdate};
use crate::repositories::course_repo::COLUMNS as COURSE_COLUMNS;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, course_id, title, description, image_ref, price, video_ref, status_id, submitted_at";

/// Same list qualified for joins against `courses`.
const QUALIFIED_COLUMNS: &str = "u.id, u.course_id, u.title, u.description, u.image_ref, \
    u.price, u.video_ref, u.status_id, u.submitted_at";

/// Provides record-level operations for course updates.
pub struct CourseUpdateRepo;

impl CourseUpdateRepo {
    /// Insert a new pending update for a course, removing any prior pending
    /// update in the same transaction so at most one stays active.
    pub async fn create_superseding(
        pool: &PgPool,
        course_id: DbId,
        overlay: &CourseOverlay,
        now: Timestamp,
    ) -> Result<CourseUpdate, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM course_updates WHERE course_id = $1 AND status_id = $2")
            .bind(course_id)
            .bind(CourseStatus::Pending.id())
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO course_updates
                (course_id, title, description, image_ref, price, video_ref,
                 status_id, submitted_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let update = sqlx::query_as::<_, CourseUpdate>(&query)
            .bind(course_id)
            .bind(&overlay.title)
            .bind(&overlay.description)
            .bind(&overlay.image_ref)
            .bind(overlay.price)
            .bind(&overlay.video_ref)
            .bind(CourseStatus::Pending.id())
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(update)
    }

    /// The latest update in {Pending, Approved} for a course, tie-broken by
    /// `submitted_at` then `id` descending.
    pub async fn latest_qualifying(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Option<CourseUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_updates
             WHERE course_id = $1 AND status_id IN ($2, $3)
             ORDER BY submitted_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, CourseUpdate>(&query)
            .bind(course_id)
            .bind(CourseStatus::Pending.id())
            .bind(CourseStatus::Approved.id())
            .fetch_optional(pool)
            .await
    }

    /// The latest pending update for a course, if any.
    pub async fn find_pending(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Option<CourseUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_updates
             WHERE course_id = $1 AND status_id = $2
             ORDER BY submitted_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, CourseUpdate>(&query)
            .bind(course_id)
            .bind(CourseStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Flip a course's pending update(s) to Rejected, leaving the rows in
    /// storage for history. The status filter doubles as the concurrency
    /// check: a decision that already landed makes this return `false`.
    pub async fn reject_pending(pool: &PgPool, course_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE course_updates SET status_id = $2
             WHERE course_id = $1 AND status_id = $3",
        )
        .bind(course_id)
        .bind(CourseStatus::Rejected.id())
        .bind(CourseStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Merge a course's pending update into the base course and retire the
    /// update row, as a single transaction.
    ///
    /// The `status_id = Pending` guard on the update-row flip is the
    /// compare-and-swap: of two concurrent approvals exactly one sees the
    /// row still pending and merges; the other observes zero affected rows
    /// and reports `false`.
    pub async fn approve_and_merge(
        pool: &PgPool,
        course_id: DbId,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM course_updates
             WHERE course_id = $1 AND status_id = $2
             ORDER BY submitted_at DESC, id DESC
             LIMIT 1
             FOR UPDATE"
        );
        let update = sqlx::query_as::<_, CourseUpdate>(&select)
            .bind(course_id)
            .bind(CourseStatus::Pending.id())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(update) = update else {
            tx.rollback().await?;
            return Ok(false);
        };

        let flipped = sqlx::query(
            "UPDATE course_updates SET status_id = $2 WHERE id = $1 AND status_id = $3",
        )
        .bind(update.id)
        .bind(CourseStatus::Approved.id())
        .bind(CourseStatus::Pending.id())
        .execute(&mut *tx)
        .await?;
        if flipped.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let select_course = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1 FOR UPDATE");
        let course = sqlx::query_as::<_, Course>(&select_course)
            .bind(course_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(mut course) = course else {
            tx.rollback().await?;
            return Ok(false);
        };

        course.apply_overlay(&update.overlay());

        sqlx::query(
            "UPDATE courses SET
                title = $2, description = $3, image_ref = $4, price = $5,
                video_ref = $6, status_id = $7, is_archived = false,
                updated_at = $8
             WHERE id = $1",
        )
        .bind(course.id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.image_ref)
        .bind(course.price)
        .bind(&course.video_ref)
        .bind(CourseStatus::Approved.id())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM course_updates WHERE id = $1")
            .bind(update.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// List an instructor's pending updates whose parent course is not
    /// archived, most recently submitted first.
    pub async fn pending_by_instructor(
        pool: &PgPool,
        instructor_id: DbId,
    ) -> Result<Vec<CourseUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {QUALIFIED_COLUMNS}
             FROM course_updates u
             JOIN courses c ON c.id = u.course_id
             WHERE u.status_id = $2
               AND c.instructor_id = $1
               AND NOT c.is_archived
             ORDER BY u.submitted_at DESC, u.id DESC"
        );
        sqlx::query_as::<_, CourseUpdate>(&query)
            .bind(instructor_id)
            .bind(CourseStatus::Pending.id())
            .fetch_all(pool)
            .await
    }
}
