//! Read-time resolution of a base course against its latest revision.
//!
//! Resolution never mutates anything: it picks the latest update in
//! {Pending, Approved} for a course and overlays its non-null fields onto
//! the base record, so callers never see a half-applied revision. This is
//! what lets a course whose base status is Rejected still display as
//! Pending once the instructor has proposed a fix.

use serde::Serialize;

use courseflow_core::status::{CourseStatus, QUALIFYING_UPDATE_STATUSES};
use courseflow_core::types::{DbId, Timestamp};
use courseflow_db::models::course::Course;
use courseflow_db::models::course_update::CourseUpdate;

/// A course as it should currently be displayed.
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveCourse {
    /// Row identity: the course id, or the update's own id for the
    /// pseudo-rows in per-instructor listings.
    pub id: DbId,
    /// The base course, always.
    pub course_id: DbId,
    pub title: String,
    pub description: String,
    pub image_ref: Option<String>,
    pub price: i64,
    pub video_ref: Option<String>,
    pub instructor_id: DbId,
    pub instructor_name: String,
    pub category_id: DbId,
    pub category_name: String,
    /// The update's status when a revision overlays the base record, else
    /// the base course's status.
    pub status: CourseStatus,
    pub is_archived: bool,
    /// Whether a revision is overlaying the base record.
    pub is_update: bool,
    /// The update's `submitted_at` when overlaid, else the course's
    /// `updated_at`. Listings sort on this.
    pub last_updated: Timestamp,
}

/// Select the latest update in {Pending, Approved}, tie-broken by
/// `submitted_at` then `id` descending.
pub fn latest_qualifying<'a, I>(updates: I) -> Option<&'a CourseUpdate>
where
    I: IntoIterator<Item = &'a CourseUpdate>,
{
    updates
        .into_iter()
        .filter(|u| {
            u.status()
                .is_some_and(|s| QUALIFYING_UPDATE_STATUSES.contains(&s))
        })
        .max_by_key(|u| (u.submitted_at, u.id))
}

/// Overlay `update` (if any) onto `course` into one effective view.
pub fn effective(course: &Course, update: Option<&CourseUpdate>) -> EffectiveCourse {
    let mut content = course.clone();
    let (status, is_update, last_updated) = match update {
        Some(update) => {
            content.apply_overlay(&update.overlay());
            (
                update.status().unwrap_or(CourseStatus::Pending),
                true,
                update.submitted_at,
            )
        }
        None => (
            course.status().unwrap_or(CourseStatus::Pending),
            false,
            course.updated_at,
        ),
    };

    EffectiveCourse {
        id: course.id,
        course_id: course.id,
        title: content.title,
        description: content.description,
        image_ref: content.image_ref,
        price: content.price,
        video_ref: content.video_ref,
        instructor_id: course.instructor_id,
        instructor_name: course.instructor_name.clone(),
        category_id: course.category_id,
        category_name: course.category_name.clone(),
        status,
        is_archived: course.is_archived,
        is_update,
        last_updated,
    }
}

/// Render a pending update as a pseudo-course row for per-instructor
/// listings: same overlay rule as [`effective`], but the row carries the
/// update's own id.
pub fn instructor_update_row(course: &Course, update: &CourseUpdate) -> EffectiveCourse {
    let mut row = effective(course, Some(update));
    row.id = update.id;
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use courseflow_db::models::course_update::CourseOverlay;

    fn course(status: CourseStatus) -> Course {
        Course {
            id: 1,
            title: "Go Basics".to_string(),
            description: "Learn Go from scratch".to_string(),
            image_ref: Some("images/aaa".to_string()),
            price: 100,
            video_ref: None,
            instructor_id: 7,
            instructor_name: "Ada Doe".to_string(),
            category_id: 3,
            category_name: "Programming".to_string(),
            status_id: status.id(),
            is_archived: false,
            created_at: Utc::now() - Duration::days(2),
            updated_at: Utc::now() - Duration::days(1),
            approved_at: None,
        }
    }

    fn update(id: DbId, status: CourseStatus, submitted_at: Timestamp) -> CourseUpdate {
        CourseUpdate {
            id,
            course_id: 1,
            title: Some("Go Basics 2nd Edition".to_string()),
            description: None,
            image_ref: None,
            price: None,
            video_ref: None,
            status_id: status.id(),
            submitted_at,
        }
    }

    #[test]
    fn overlay_uses_base_values_for_unset_fields() {
        let base = course(CourseStatus::Approved);
        let rev = update(11, CourseStatus::Approved, Utc::now());

        let view = effective(&base, Some(&rev));
        assert_eq!(view.title, "Go Basics 2nd Edition");
        assert_eq!(view.price, 100);
        assert_eq!(view.description, "Learn Go from scratch");
        assert!(view.is_update);
    }

    #[test]
    fn no_update_resolves_to_base_course() {
        let base = course(CourseStatus::Approved);
        let view = effective(&base, None);
        assert_eq!(view.title, "Go Basics");
        assert_eq!(view.status, CourseStatus::Approved);
        assert!(!view.is_update);
        assert_eq!(view.last_updated, base.updated_at);
    }

    #[test]
    fn tie_break_prefers_latest_submission() {
        let t1 = Utc::now() - Duration::hours(2);
        let t2 = Utc::now() - Duration::hours(1);
        let updates = vec![
            update(11, CourseStatus::Pending, t1),
            update(12, CourseStatus::Pending, t2),
        ];

        let picked = latest_qualifying(&updates).unwrap();
        assert_eq!(picked.id, 12);
    }

    #[test]
    fn exact_timestamp_ties_break_by_id_descending() {
        let t = Utc::now();
        let updates = vec![
            update(11, CourseStatus::Pending, t),
            update(12, CourseStatus::Pending, t),
        ];

        let picked = latest_qualifying(&updates).unwrap();
        assert_eq!(picked.id, 12);
    }

    #[test]
    fn rejected_updates_never_qualify() {
        let newer = Utc::now();
        let older = newer - Duration::hours(1);
        let updates = vec![
            update(11, CourseStatus::Approved, older),
            update(12, CourseStatus::Rejected, newer),
        ];

        let picked = latest_qualifying(&updates).unwrap();
        assert_eq!(picked.id, 11);

        let only_rejected = vec![update(13, CourseStatus::Rejected, newer)];
        assert!(latest_qualifying(&only_rejected).is_none());
    }

    #[test]
    fn rejected_base_with_pending_fix_displays_as_pending() {
        let base = course(CourseStatus::Rejected);
        let fix = update(11, CourseStatus::Pending, Utc::now());

        let view = effective(&base, Some(&fix));
        assert_eq!(view.status, CourseStatus::Pending);
        assert!(view.is_update);
    }

    #[test]
    fn instructor_row_carries_the_update_id() {
        let base = course(CourseStatus::Approved);
        let rev = update(42, CourseStatus::Pending, Utc::now());

        let row = instructor_update_row(&base, &rev);
        assert_eq!(row.id, 42);
        assert_eq!(row.course_id, 1);
        assert_eq!(row.title, "Go Basics 2nd Edition");
        assert!(row.is_update);
    }
}
