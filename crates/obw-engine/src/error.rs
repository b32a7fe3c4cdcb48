//! Engine error taxonomy.

use obw_core::ValidationError;
use obw_store::StoreError;
use thiserror::Error;

use crate::readiness::ReadinessReport;

/// Errors surfaced by engine operations. None of them are recovered
/// internally.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// Policy, plan version, category, service or assignment absent.
    #[error("{0}")]
    NotFound(String),

    /// Mutating a non-DRAFT version's sub-configuration, or losing a
    /// unique-key race on creation.
    #[error("{0}")]
    Conflict(String),

    /// Operation not permitted in the current state (publishing a
    /// non-DRAFT version, making a future version current, inverted dates).
    #[error("{0}")]
    BadRequest(String),

    /// Field-level validation failure.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Publish attempted while readiness is BLOCKED. Carries every check.
    #[error("plan version is not ready to publish: {}", .0.failure_messages().join("; "))]
    ReadinessBlocked(ReadinessReport),

    /// Backing store failure.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotEditable { .. } | StoreError::Duplicate { .. } => {
                Self::Conflict(err.to_string())
            }
            StoreError::Missing { .. } => Self::NotFound(err.to_string()),
            StoreError::Transition(e) => Self::BadRequest(e.to_string()),
            StoreError::Unavailable(_) => Self::Store(err),
        }
    }
}
