//! # obw-state: Plan Version State Machine
//!
//! Implements the lifecycle of a plan version:
//!
//! ```text
//! DRAFT ──publish──▶ PUBLISHED ──archive──▶ ARCHIVED (terminal)
//! ```
//!
//! Status only advances forward. There is no method that moves a version
//! back to an earlier state, so the invariant holds by construction rather
//! than by a runtime check at every call site.
//!
//! A version's sub-configurations (benefit components, wallet rules,
//! coverage rows) are editable only while the version is DRAFT; callers
//! check [`PlanVersion::is_draft`] before writing.

pub mod plan_version;

pub use plan_version::{
    PlanVersion, PlanVersionError, PlanVersionStatus, PlanVersionTransitionRecord,
};
