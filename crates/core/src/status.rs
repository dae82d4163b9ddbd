//! Course and revision lifecycle statuses.
//!
//! Both `courses.status_id` and `course_updates.status_id` use the same
//! three-value moderation status. Variant discriminants match the seed data
//! order (1-based) in the `course_statuses` lookup table.

use serde::Serialize;

use crate::types::StatusId;

/// Moderation status shared by courses and course updates.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    /// Submitted and awaiting a moderator decision.
    Pending = 1,
    /// Accepted by a moderator; live content.
    Approved = 2,
    /// Refused by a moderator; kept for history.
    Rejected = 3,
}

/// All statuses, in seed-data order.
pub const ALL_STATUSES: &[CourseStatus] = &[
    CourseStatus::Pending,
    CourseStatus::Approved,
    CourseStatus::Rejected,
];

/// Statuses whose updates qualify for resolution against a base course.
/// A rejected update never overlays the live record.
pub const QUALIFYING_UPDATE_STATUSES: &[CourseStatus] =
    &[CourseStatus::Pending, CourseStatus::Approved];

impl CourseStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Pending),
            2 => Some(Self::Approved),
            3 => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Lowercase wire/display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether a moderator may approve a course currently in this status.
    ///
    /// `Pending -> Approved` is the normal path and re-approving an already
    /// approved course is an idempotent re-stamp. There is no direct
    /// `Rejected -> Approved` edge: a rejected course only returns to
    /// approved through an accepted revision.
    pub fn can_approve(self) -> bool {
        !matches!(self, Self::Rejected)
    }

    /// Whether a moderator may reject a course currently in this status.
    ///
    /// An already-live course can be pulled, so rejection is allowed from
    /// every status.
    pub fn can_reject(self) -> bool {
        true
    }
}

impl From<CourseStatus> for StatusId {
    fn from(value: CourseStatus) -> Self {
        value as StatusId
    }
}
