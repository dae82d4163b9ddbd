//! Course entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use courseflow_core::status::CourseStatus;
use courseflow_core::types::{DbId, StatusId, Timestamp};

use crate::models::course_update::CourseOverlay;

/// A course row from the `courses` table.
///
/// Instructor and category display names are denormalized onto the row so
/// catalog search can match them without reaching into the identity source.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub image_ref: Option<String>,
    /// Price in minor currency units.
    pub price: i64,
    pub video_ref: Option<String>,
    pub instructor_id: DbId,
    pub instructor_name: String,
    pub category_id: DbId,
    pub category_name: String,
    pub status_id: StatusId,
    pub is_archived: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub approved_at: Option<Timestamp>,
}

impl Course {
    /// Typed view of `status_id`. Unknown ids map to `None`.
    pub fn status(&self) -> Option<CourseStatus> {
        CourseStatus::from_id(self.status_id)
    }

    /// Apply a revision overlay to this row's content fields.
    ///
    /// Only fields the overlay actually sets are replaced; `None` fields
    /// keep the base values. Lifecycle fields are untouched; merge-on-approve
    /// stamps those separately.
    pub fn apply_overlay(&mut self, overlay: &CourseOverlay) {
        if let Some(title) = &overlay.title {
            self.title = title.clone();
        }
        if let Some(description) = &overlay.description {
            self.description = description.clone();
        }
        if let Some(image_ref) = &overlay.image_ref {
            self.image_ref = Some(image_ref.clone());
        }
        if let Some(price) = overlay.price {
            self.price = price;
        }
        if let Some(video_ref) = &overlay.video_ref {
            self.video_ref = Some(video_ref.clone());
        }
    }

    /// The fields catalog search matches against.
    pub fn searchable_fields(&self) -> [&str; 4] {
        [
            &self.title,
            &self.description,
            &self.category_name,
            &self.instructor_name,
        ]
    }
}

/// DTO for creating a new course.
///
/// Media references arrive already stored; the caller's input layer owns
/// the initial upload. New courses always start as Pending.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: String,
    pub image_ref: Option<String>,
    pub price: i64,
    pub video_ref: Option<String>,
    pub instructor_id: DbId,
    pub instructor_name: String,
    pub category_id: DbId,
    pub category_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn base_course() -> Course {
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
            status_id: CourseStatus::Approved.id(),
            is_archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            approved_at: Some(Utc::now()),
        }
    }

    #[test]
    fn overlay_replaces_only_set_fields() {
        let mut course = base_course();
        course.apply_overlay(&CourseOverlay {
            title: Some("Go Basics 2nd Edition".to_string()),
            description: None,
            image_ref: None,
            price: Some(150),
            video_ref: None,
        });

        assert_eq!(course.title, "Go Basics 2nd Edition");
        assert_eq!(course.price, 150);
        assert_eq!(course.description, "Learn Go from scratch");
        assert_eq!(course.image_ref.as_deref(), Some("images/aaa"));
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let mut course = base_course();
        let before = course.clone();
        course.apply_overlay(&CourseOverlay::default());

        assert_eq!(course.title, before.title);
        assert_eq!(course.description, before.description);
        assert_eq!(course.price, before.price);
        assert_eq!(course.image_ref, before.image_ref);
        assert_eq!(course.video_ref, before.video_ref);
    }

    #[test]
    fn overlay_can_set_previously_absent_media() {
        let mut course = base_course();
        course.apply_overlay(&CourseOverlay {
            video_ref: Some("videos/bbb".to_string()),
            ..CourseOverlay::default()
        });
        assert_eq!(course.video_ref.as_deref(), Some("videos/bbb"));
    }

    #[test]
    fn overlay_leaves_lifecycle_fields_alone() {
        let mut course = base_course();
        course.apply_overlay(&CourseOverlay {
            title: Some("New".to_string()),
            ..CourseOverlay::default()
        });
        assert_eq!(course.status(), Some(CourseStatus::Approved));
        assert!(!course.is_archived);
    }

    #[test]
    fn searchable_fields_cover_names() {
        let course = base_course();
        let fields = course.searchable_fields();
        assert!(fields.contains(&"Programming"));
        assert!(fields.contains(&"Ada Doe"));
    }
}
