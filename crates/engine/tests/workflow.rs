//! End-to-end workflow tests over the in-memory store.

use std::sync::Arc;

use assert_matches::assert_matches;
use courseflow_core::status::CourseStatus;
use courseflow_db::models::course::CreateCourse;
use courseflow_engine::{
    CourseWorkflow, LocalMediaStore, MemoryCourseStore, ProposedEdit,
};
use courseflow_events::bus::{
    COURSE_APPROVED, COURSE_SUBMITTED, UPDATE_REJECTED, UPDATE_SUBMITTED,
};
use courseflow_events::EventBus;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    workflow: CourseWorkflow<MemoryCourseStore, LocalMediaStore>,
    bus: Arc<EventBus>,
    // Keeps the media directory alive for the test's duration.
    _media_dir: TempDir,
}

fn harness() -> Harness {
    let media_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryCourseStore::new());
    let media = Arc::new(LocalMediaStore::new(media_dir.path()));
    let bus = Arc::new(EventBus::default());
    Harness {
        workflow: CourseWorkflow::new(store, media, Arc::clone(&bus)),
        bus,
        _media_dir: media_dir,
    }
}

fn draft(instructor_id: i64, title: &str, price: i64) -> CreateCourse {
    CreateCourse {
        title: title.to_string(),
        description: format!("All about {title}"),
        image_ref: None,
        price,
        video_ref: None,
        instructor_id,
        instructor_name: "Ada Doe".to_string(),
        category_id: 1,
        category_name: "Programming".to_string(),
    }
}

fn price_edit(price: i64) -> ProposedEdit {
    ProposedEdit {
        price: Some(price),
        ..ProposedEdit::default()
    }
}

// ---------------------------------------------------------------------------
// The full publish-revise-merge cycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_then_revise_then_merge() {
    let h = harness();

    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    assert_eq!(course.status(), Some(CourseStatus::Pending));

    assert!(h.workflow.approve_course(course.id).await.unwrap());
    let live = h.workflow.get_effective_course(course.id).await.unwrap().unwrap();
    assert_eq!(live.status, CourseStatus::Approved);
    assert!(!live.is_update);

    assert!(h.workflow.propose_update(course.id, price_edit(150)).await.unwrap());
    let proposed = h.workflow.get_effective_course(course.id).await.unwrap().unwrap();
    assert_eq!(proposed.title, "Go Basics");
    assert_eq!(proposed.price, 150);
    assert_eq!(proposed.status, CourseStatus::Pending);
    assert!(proposed.is_update);

    assert!(h.workflow.approve_update(course.id).await.unwrap());
    let merged = h.workflow.get_effective_course(course.id).await.unwrap().unwrap();
    assert_eq!(merged.price, 150);
    assert_eq!(merged.status, CourseStatus::Approved);
    assert!(!merged.is_update);

    // The overlay landed on the base record and the update row is gone.
    let base = h.workflow.registry().course(course.id).await.unwrap().unwrap();
    assert_eq!(base.price, 150);
    assert!(h
        .workflow
        .revisions()
        .latest_pending_or_approved(course.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn effective_view_of_missing_course_is_none() {
    let h = harness();
    assert!(h.workflow.get_effective_course(999).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Course moderation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn moderating_a_missing_course_fails() {
    let h = harness();
    assert!(!h.workflow.approve_course(999).await.unwrap());
    assert!(!h.workflow.reject_course(999).await.unwrap());
}

#[tokio::test]
async fn reapproving_an_approved_course_is_idempotent() {
    let h = harness();
    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();

    assert!(h.workflow.approve_course(course.id).await.unwrap());
    assert!(h.workflow.approve_course(course.id).await.unwrap());

    let view = h.workflow.get_effective_course(course.id).await.unwrap().unwrap();
    assert_eq!(view.status, CourseStatus::Approved);
}

#[tokio::test]
async fn a_live_course_can_be_pulled() {
    let h = harness();
    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();

    assert!(h.workflow.approve_course(course.id).await.unwrap());
    assert!(h.workflow.reject_course(course.id).await.unwrap());

    let view = h.workflow.get_effective_course(course.id).await.unwrap().unwrap();
    assert_eq!(view.status, CourseStatus::Rejected);
}

#[tokio::test]
async fn a_rejected_course_cannot_be_approved_directly() {
    let h = harness();
    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    assert!(h.workflow.reject_course(course.id).await.unwrap());

    assert!(!h.workflow.approve_course(course.id).await.unwrap());

    // The only way back is an accepted revision.
    assert!(h.workflow.propose_update(course.id, price_edit(90)).await.unwrap());
    assert!(h.workflow.approve_update(course.id).await.unwrap());

    let base = h.workflow.registry().course(course.id).await.unwrap().unwrap();
    assert_eq!(base.status(), Some(CourseStatus::Approved));
    assert!(!base.is_archived);
}

// ---------------------------------------------------------------------------
// Revision moderation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn proposing_against_a_missing_course_fails() {
    let h = harness();
    assert!(!h.workflow.propose_update(999, price_edit(1)).await.unwrap());
}

#[tokio::test]
async fn an_empty_proposal_is_refused() {
    let h = harness();
    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    assert!(!h
        .workflow
        .propose_update(course.id, ProposedEdit::default())
        .await
        .unwrap());
}

#[tokio::test]
async fn approving_an_update_twice_fails_the_second_time() {
    let h = harness();
    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    h.workflow.approve_course(course.id).await.unwrap();
    h.workflow.propose_update(course.id, price_edit(150)).await.unwrap();

    assert!(h.workflow.approve_update(course.id).await.unwrap());
    assert!(!h.workflow.approve_update(course.id).await.unwrap());

    // The second call must not have re-applied anything.
    let base = h.workflow.registry().course(course.id).await.unwrap().unwrap();
    assert_eq!(base.price, 150);
}

#[tokio::test]
async fn rejecting_an_update_leaves_the_base_course_alone() {
    let h = harness();
    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    h.workflow.approve_course(course.id).await.unwrap();
    h.workflow
        .propose_update(
            course.id,
            ProposedEdit {
                title: Some("Clickbait title".to_string()),
                ..ProposedEdit::default()
            },
        )
        .await
        .unwrap();

    assert!(h.workflow.reject_update(course.id).await.unwrap());
    assert!(!h.workflow.reject_update(course.id).await.unwrap());

    let view = h.workflow.get_effective_course(course.id).await.unwrap().unwrap();
    assert_eq!(view.title, "Go Basics");
    assert_eq!(view.status, CourseStatus::Approved);
    assert!(!view.is_update);
}

#[tokio::test]
async fn a_newer_proposal_supersedes_the_older_draft() {
    let h = harness();
    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    h.workflow.approve_course(course.id).await.unwrap();

    h.workflow.propose_update(course.id, price_edit(150)).await.unwrap();
    h.workflow.propose_update(course.id, price_edit(200)).await.unwrap();

    let view = h.workflow.get_effective_course(course.id).await.unwrap().unwrap();
    assert_eq!(view.price, 200);

    assert!(h.workflow.approve_update(course.id).await.unwrap());
    let base = h.workflow.registry().course(course.id).await.unwrap().unwrap();
    assert_eq!(base.price, 200);
    // Only one merge is possible: the older draft was superseded, not queued.
    assert!(!h.workflow.approve_update(course.id).await.unwrap());
}

#[tokio::test]
async fn proposed_media_is_uploaded_before_the_overlay_is_stored() {
    let h = harness();
    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    h.workflow.approve_course(course.id).await.unwrap();

    let edit = ProposedEdit {
        image: Some(b"new poster".to_vec()),
        video: Some(b"new trailer".to_vec()),
        ..ProposedEdit::default()
    };
    assert!(h.workflow.propose_update(course.id, edit).await.unwrap());

    let view = h.workflow.get_effective_course(course.id).await.unwrap().unwrap();
    assert!(view.image_ref.unwrap().starts_with("images/"));
    assert!(view.video_ref.unwrap().starts_with("videos/"));
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_course_with_a_pending_fix_reappears_in_the_catalog() {
    let h = harness();
    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    h.workflow.reject_course(course.id).await.unwrap();

    // Purely rejected courses disappear from review queues.
    assert!(h.workflow.list_catalog(None).await.unwrap().is_empty());

    h.workflow.propose_update(course.id, price_edit(90)).await.unwrap();

    let rows = h.workflow.list_catalog(None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, CourseStatus::Pending);
    assert!(rows[0].is_update);
}

#[tokio::test]
async fn catalog_sorts_pending_rows_first_and_honors_the_filter() {
    let h = harness();
    let a = h.workflow.create_course(&draft(7, "Approved Course", 100)).await.unwrap();
    h.workflow.approve_course(a.id).await.unwrap();
    // Created later, so newer, but Pending must still sort first.
    let p = h.workflow.create_course(&draft(7, "Pending Course", 100)).await.unwrap();

    let rows = h.workflow.list_catalog(None).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].course_id, p.id);
    assert_eq!(rows[1].course_id, a.id);

    let pending_only = h
        .workflow
        .list_catalog(Some(&[CourseStatus::Pending]))
        .await
        .unwrap();
    assert_eq!(pending_only.len(), 1);
    assert_eq!(pending_only[0].course_id, p.id);
}

#[tokio::test]
async fn catalog_overlays_the_latest_qualifying_update() {
    let h = harness();
    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    h.workflow.approve_course(course.id).await.unwrap();
    h.workflow
        .propose_update(
            course.id,
            ProposedEdit {
                title: Some("Go Basics, Revised".to_string()),
                ..ProposedEdit::default()
            },
        )
        .await
        .unwrap();

    let rows = h.workflow.list_catalog(None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Go Basics, Revised");
    assert_eq!(rows[0].status, CourseStatus::Pending);
}

#[tokio::test]
async fn instructor_listing_shows_raw_courses_and_update_pseudo_rows() {
    let h = harness();
    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    h.workflow.approve_course(course.id).await.unwrap();
    let other = h.workflow.create_course(&draft(8, "Someone Else's", 50)).await.unwrap();
    h.workflow
        .propose_update(
            course.id,
            ProposedEdit {
                title: Some("Go Basics, Revised".to_string()),
                ..ProposedEdit::default()
            },
        )
        .await
        .unwrap();

    let rows = h.workflow.list_by_instructor(7).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.course_id != other.id));

    let pseudo = rows.iter().find(|r| r.is_update).unwrap();
    assert_ne!(pseudo.id, course.id);
    assert_eq!(pseudo.course_id, course.id);
    assert_eq!(pseudo.title, "Go Basics, Revised");
    assert_eq!(pseudo.status, CourseStatus::Pending);

    // The base row renders its own fields, not the overlay.
    let base_row = rows.iter().find(|r| !r.is_update).unwrap();
    assert_eq!(base_row.id, course.id);
    assert_eq!(base_row.title, "Go Basics");
    assert_eq!(base_row.status, CourseStatus::Approved);
}

#[tokio::test]
async fn registry_query_helpers_cover_counts_and_search() {
    let h = harness();
    h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    h.workflow.create_course(&draft(7, "Advanced Go", 200)).await.unwrap();
    h.workflow.create_course(&draft(8, "Watercolor", 50)).await.unwrap();

    assert_eq!(h.workflow.registry().count_by_instructor(7).await.unwrap(), 2);
    assert_eq!(h.workflow.registry().by_instructor(8).await.unwrap().len(), 1);

    let hits = h.workflow.search_catalog("go").await.unwrap();
    assert_eq!(hits.len(), 2);
    assert!(h.workflow.search_catalog("  ").await.unwrap().is_empty());

    let pending = h
        .workflow
        .registry()
        .by_status(&[CourseStatus::Pending])
        .await
        .unwrap();
    assert_eq!(pending.len(), 3);
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn workflow_outcomes_are_published_on_the_bus() {
    let h = harness();
    let mut rx = h.bus.subscribe();

    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    let submitted = rx.recv().await.unwrap();
    assert_eq!(submitted.event_type, COURSE_SUBMITTED);
    assert_eq!(submitted.course_id, course.id);
    assert_eq!(submitted.instructor_id, 7);

    h.workflow.approve_course(course.id).await.unwrap();
    assert_eq!(rx.recv().await.unwrap().event_type, COURSE_APPROVED);

    h.workflow.propose_update(course.id, price_edit(150)).await.unwrap();
    let proposed = rx.recv().await.unwrap();
    assert_eq!(proposed.event_type, UPDATE_SUBMITTED);
    assert!(proposed.payload["update_id"].is_i64());

    h.workflow.reject_update(course.id).await.unwrap();
    assert_eq!(rx.recv().await.unwrap().event_type, UPDATE_REJECTED);
}

#[tokio::test]
async fn refused_transitions_publish_nothing() {
    let h = harness();
    let course = h.workflow.create_course(&draft(7, "Go Basics", 100)).await.unwrap();
    h.workflow.reject_course(course.id).await.unwrap();

    let mut rx = h.bus.subscribe();
    assert!(!h.workflow.approve_course(course.id).await.unwrap());
    assert!(!h.workflow.approve_update(course.id).await.unwrap());

    assert_matches!(
        rx.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    );
}
