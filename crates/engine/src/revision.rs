//! The Revision Manager: proposed edits against existing courses.
//!
//! Owns creation and retirement of `CourseUpdate` rows and the read-time
//! resolution rule. Merge-on-approve is the one operation where this
//! component writes into a Course record; the store boundary applies that
//! write atomically with a still-Pending compare-and-swap.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use courseflow_core::types::DbId;
use courseflow_db::models::course_update::{CourseOverlay, CourseUpdate};
use courseflow_events::bus::{UPDATE_APPROVED, UPDATE_REJECTED, UPDATE_SUBMITTED};
use courseflow_events::{CourseEvent, EventBus};

use crate::error::WorkflowResult;
use crate::media::{MediaKind, MediaStore};
use crate::resolve::{self, EffectiveCourse};
use crate::store::CourseStore;

/// An instructor's proposed edit. Unset fields mean "leave unchanged";
/// replacement media arrives as raw bytes and is uploaded through the
/// media store before the overlay is persisted.
#[derive(Debug, Clone, Default)]
pub struct ProposedEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub image: Option<Vec<u8>>,
    pub video: Option<Vec<u8>>,
}

impl ProposedEdit {
    /// Whether the edit changes anything at all.
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.price.is_some()
            || self.image.is_some()
            || self.video.is_some()
    }
}

/// Manages proposed edits without mutating the live record until a
/// moderator accepts the change.
pub struct RevisionManager<S: CourseStore, M: MediaStore> {
    store: Arc<S>,
    media: Arc<M>,
    bus: Arc<EventBus>,
}

impl<S: CourseStore, M: MediaStore> RevisionManager<S, M> {
    pub fn new(store: Arc<S>, media: Arc<M>, bus: Arc<EventBus>) -> Self {
        Self { store, media, bus }
    }

    /// Propose an edit to an existing course.
    ///
    /// Returns `false` if the course does not exist or the edit changes
    /// nothing. A prior pending draft is superseded, not accumulated.
    pub async fn propose(&self, course_id: DbId, edit: ProposedEdit) -> WorkflowResult<bool> {
        let Some(course) = self.store.course(course_id).await? else {
            return Ok(false);
        };
        if !edit.has_changes() {
            tracing::warn!(course_id, "Ignoring an empty edit proposal");
            return Ok(false);
        }

        let image_ref = match &edit.image {
            Some(bytes) => Some(self.media.store(bytes, MediaKind::Image).await?),
            None => None,
        };
        let video_ref = match &edit.video {
            Some(bytes) => Some(self.media.store(bytes, MediaKind::Video).await?),
            None => None,
        };

        let overlay = CourseOverlay {
            title: edit.title,
            description: edit.description,
            image_ref,
            price: edit.price,
            video_ref,
        };
        let update = self
            .store
            .put_pending_update(course_id, &overlay, Utc::now())
            .await?;

        tracing::info!(
            course_id,
            update_id = update.id,
            instructor_id = course.instructor_id,
            "Revision proposed"
        );
        self.bus.publish(
            CourseEvent::new(UPDATE_SUBMITTED, course_id, course.instructor_id)
                .with_payload(json!({ "update_id": update.id })),
        );
        Ok(true)
    }

    /// Compute the course as it should currently be displayed, or `None`
    /// if the course does not exist.
    pub async fn resolve(&self, course_id: DbId) -> WorkflowResult<Option<EffectiveCourse>> {
        let Some(course) = self.store.course(course_id).await? else {
            return Ok(None);
        };
        let latest = self.store.latest_qualifying_update(course_id).await?;
        Ok(Some(resolve::effective(&course, latest.as_ref())))
    }

    /// Approve the course's pending update: merge it into the base course
    /// and retire the update row.
    ///
    /// Returns `false` if nothing is pending or the course is missing. A
    /// concurrent approval losing the still-Pending compare-and-swap is
    /// the same normal `false`, not an error.
    pub async fn approve(&self, course_id: DbId) -> WorkflowResult<bool> {
        let Some(course) = self.store.course(course_id).await? else {
            return Ok(false);
        };
        if self.store.pending_update(course_id).await?.is_none() {
            return Ok(false);
        }

        let merged = self
            .store
            .merge_pending_update(course_id, Utc::now())
            .await?;
        if merged {
            tracing::info!(course_id, decision = "approved", "Revision merged");
            self.bus
                .publish(CourseEvent::new(UPDATE_APPROVED, course_id, course.instructor_id));
        } else {
            tracing::info!(course_id, "Revision no longer pending, merge skipped");
        }
        Ok(merged)
    }

    /// Reject the course's pending update. The update row stays in storage
    /// with Rejected status for history; the base course is untouched.
    pub async fn reject(&self, course_id: DbId) -> WorkflowResult<bool> {
        let Some(course) = self.store.course(course_id).await? else {
            return Ok(false);
        };

        let rejected = self.store.reject_pending_update(course_id).await?;
        if rejected {
            tracing::info!(course_id, decision = "rejected", "Revision rejected");
            self.bus
                .publish(CourseEvent::new(UPDATE_REJECTED, course_id, course.instructor_id));
        }
        Ok(rejected)
    }

    /// The latest update in {Pending, Approved} for a course. Doubles as
    /// the "does this instructor have an open edit" probe.
    pub async fn latest_pending_or_approved(
        &self,
        course_id: DbId,
    ) -> WorkflowResult<Option<CourseUpdate>> {
        Ok(self.store.latest_qualifying_update(course_id).await?)
    }
}
