//! # obw-store: Records, Repository Contracts and the Reference Store
//!
//! The engine talks to persistence only through the traits in
//! [`repository`]. This crate also provides [`MemoryStore`], a complete
//! in-memory implementation of every contract, and the [`audit`] sink
//! contract with in-memory and tracing-backed sinks.
//!
//! ## Concurrency
//!
//! Unique compound keys are the only concurrency control the contracts
//! assume: `(policyId, planVersion)` for versions and sub-configurations,
//! and `(policyId, planVersion, categoryId, serviceCode)` for coverage rows.
//! The loser of a concurrent insert sees [`StoreError::Duplicate`].

pub mod audit;
pub mod error;
pub mod memory;
pub mod records;
pub mod reference;
pub mod repository;

pub use audit::{
    record_or_warn, AuditAction, AuditEvent, AuditSink, CompositeAuditSink, MemoryAuditLog,
    TracingAuditSink,
};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use records::{
    Assignment, AssignmentStatus, BenefitComponentConfig, BenefitComponentSet, BenefitComponents,
    CarryForward, Category, Copay, CopayMode, CoverageRow, CoverageWrite, Policy, Service,
    WalletRuleSet, WalletRules,
};
pub use reference::{reference_categories, reference_services};
pub use repository::{
    AssignmentRepository, BenefitComponentRepository, CoverageMatrixRepository,
    MasterDataRepository, PlanVersionRepository, PolicyRepository, Upserted, WalletRuleRepository,
};
