//! Shared error types for the services crate.

use thiserror::Error;

use pace_core::model::PlanError;
use pace_core::pace::PaceError;
use storage::repository::StorageError;

/// Errors emitted by `PlanService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlanServiceError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PaceService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PaceServiceError {
    #[error(transparent)]
    Pace(#[from] PaceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
