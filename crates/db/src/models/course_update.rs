//! Course update (proposed revision) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use courseflow_core::status::CourseStatus;
use courseflow_core::types::{DbId, StatusId, Timestamp};

/// A proposed, not-yet-live change set against an existing course, from the
/// `course_updates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseUpdate {
    pub id: DbId,
    pub course_id: DbId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_ref: Option<String>,
    pub price: Option<i64>,
    pub video_ref: Option<String>,
    pub status_id: StatusId,
    pub submitted_at: Timestamp,
}

impl CourseUpdate {
    /// Typed view of `status_id`. Unknown ids map to `None`.
    pub fn status(&self) -> Option<CourseStatus> {
        CourseStatus::from_id(self.status_id)
    }

    /// The content fields of this update as an overlay.
    pub fn overlay(&self) -> CourseOverlay {
        CourseOverlay {
            title: self.title.clone(),
            description: self.description.clone(),
            image_ref: self.image_ref.clone(),
            price: self.price,
            video_ref: self.video_ref.clone(),
        }
    }
}

/// Content overlay for a course. `None` means "leave unchanged".
///
/// Fields are explicitly optional rather than sentinel-valued so "set to
/// empty string" and "unchanged" stay distinguishable.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CourseOverlay {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_ref: Option<String>,
    pub price: Option<i64>,
    pub video_ref: Option<String>,
}

impl CourseOverlay {
    /// Whether the overlay sets no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image_ref.is_none()
            && self.price.is_none()
            && self.video_ref.is_none()
    }
}
