//! # API Route Modules
//!
//! - `plan_versions`: lifecycle, readiness and the current-version pointer.
//! - `benefits`, `wallet`, `coverage`: DRAFT-guarded sub-configuration
//!   editors for one plan version.
//! - `members`: effective configuration for admins and members.
//! - `audit`: the recorded audit trail.

pub mod audit;
pub mod benefits;
pub mod coverage;
pub mod members;
pub mod plan_versions;
pub mod wallet;
