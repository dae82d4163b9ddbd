//! Assembly and ordering rules for the aggregate listings.
//!
//! Two composition queries sit above the registry and the revision
//! manager; their merge and ordering rules live here as pure functions so
//! both stores and the facade share one definition.

use std::cmp::Ordering;

use courseflow_core::status::CourseStatus;
use courseflow_db::models::course::Course;
use courseflow_db::models::course_update::CourseUpdate;

use crate::resolve::{self, EffectiveCourse};

/// Build the catalog/admin row for a course, or `None` if the course is
/// hidden from the listing.
///
/// A course whose base status is Rejected disappears from review queues
/// unless a qualifying update is currently proposing a fix.
pub fn catalog_entry(course: &Course, latest: Option<&CourseUpdate>) -> Option<EffectiveCourse> {
    if course.status() == Some(CourseStatus::Rejected) && latest.is_none() {
        return None;
    }
    Some(resolve::effective(course, latest))
}

/// Order listing rows: resolved-Pending first, then most recently updated
/// (or submitted) first, ids descending as the final tie-break.
pub fn sort_pending_first(rows: &mut [EffectiveCourse]) {
    rows.sort_by(compare_rows);
}

fn compare_rows(a: &EffectiveCourse, b: &EffectiveCourse) -> Ordering {
    pending_rank(a)
        .cmp(&pending_rank(b))
        .then_with(|| b.last_updated.cmp(&a.last_updated))
        .then_with(|| b.id.cmp(&a.id))
}

fn pending_rank(row: &EffectiveCourse) -> u8 {
    u8::from(row.status != CourseStatus::Pending)
}
