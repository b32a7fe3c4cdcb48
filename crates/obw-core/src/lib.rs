//! # obw-core: Foundational Types for the Benefits Wallet
//!
//! Defines the type-system primitives every other crate in the workspace
//! builds on. Depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `PolicyId`, `UserId`,
//!    `CategoryId`, `ServiceCode` and `PlanVersionNumber` are distinct types
//!    with validated constructors. No bare strings or integers cross a crate
//!    boundary as identifiers.
//!
//! 2. **Single `BenefitKind` enum.** One definition, eight variants,
//!    exhaustive `match` everywhere. Adding a kind forces every consumer
//!    (defaults, normalization, category table) to handle it.
//!
//! 3. **One benefit→category table.** The mapping that decides which
//!    coverage categories are in scope is versioned reference data in
//!    [`benefit::BENEFIT_CATEGORY_TABLE_V1`], not a literal scattered across
//!    call sites.
//!
//! 4. **Explicit actor context.** Every mutation is attributed through
//!    [`ActorContext`] rather than an open-ended bag of fields.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `obw-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod actor;
pub mod benefit;
pub mod error;
pub mod identity;
pub mod temporal;

pub use actor::{ActorContext, ActorRole};
pub use benefit::{BenefitKind, BENEFIT_KIND_COUNT};
pub use error::ValidationError;
pub use identity::{CategoryId, PlanVersionNumber, PolicyId, ServiceCode, UserId};
pub use temporal::{EffectiveWindow, Timestamp};
