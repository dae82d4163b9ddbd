//! Engine-level error taxonomy.
//!
//! Refused state transitions are reported as `Ok(false)` / `Ok(None)` by
//! the operations themselves; only boundary faults become errors.

use crate::media::MediaError;
use crate::store::StoreError;

/// A hard failure at one of the engine's boundaries.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The persistence boundary failed.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The media store failed while persisting an upload.
    #[error(transparent)]
    Media(#[from] MediaError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
