//! Store-level errors.

use obw_state::PlanVersionError;
use thiserror::Error;

/// Errors raised by repository implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique compound key already exists. The losing side of a
    /// concurrent insert race sees this and may retry.
    #[error("duplicate key: {key}")]
    Duplicate {
        /// Rendered compound key.
        key: String,
    },

    /// The record addressed by a write does not exist.
    #[error("record not found: {key}")]
    Missing {
        /// Rendered compound key.
        key: String,
    },

    /// A sub-configuration write hit a plan version that is no longer DRAFT.
    #[error("plan version {key} is {status}; only DRAFT versions can be edited")]
    NotEditable {
        /// Rendered `(policyId, planVersion)` key.
        key: String,
        /// Status observed inside the write.
        status: String,
    },

    /// A status transition attempted inside the store was rejected.
    #[error(transparent)]
    Transition(#[from] PlanVersionError),

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
