//! # obw-engine: Plan Version Lifecycle and Effective Configuration
//!
//! Five cooperating services over the repository contracts of `obw-store`:
//!
//! - [`CoverageMatrixProjector`]: reconciles sparse persisted coverage rows
//!   against the category/service universe implied by the enabled benefits,
//!   emitting virtual rows for pairs with nothing persisted.
//! - [`ReadinessEvaluator`]: the single source of truth for whether a
//!   version may be published.
//! - [`PlanVersionLifecycle`]: DRAFT → PUBLISHED → ARCHIVED and the policy's
//!   current-version pointer.
//! - [`ConfigResolver`]: the normalized effective configuration for admins
//!   and members.
//! - [`BenefitComponentEditor`] and [`WalletRuleEditor`]: the DRAFT-guarded
//!   sub-configuration editors.
//!
//! ## Invariants
//!
//! - A non-DRAFT version's sub-configurations are never written.
//! - Publication happens only while readiness is READY.
//! - A member's effective version is `assignment.planVersion`, then
//!   `policy.currentPlanVersion`, then 1.
//!
//! Read paths are side-effect-free. Every mutation logs at `info` and emits
//! an audit event; audit failures are logged and swallowed.

pub mod benefits;
pub mod context;
pub mod coverage;
pub mod error;
pub mod lifecycle;
pub mod readiness;
pub mod resolver;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use benefits::BenefitComponentEditor;
pub use context::{MemberVersion, Repositories, VersionSource};
pub use coverage::{
    enabled_category_ids, BulkCoverageResult, CategoryInfo, CoverageCategoryView,
    CoverageFilters, CoverageMatrixProjector, CoverageMatrixView, CoverageServiceView,
    CoverageSummary, CoverageUpdateItem,
};
pub use error::EngineError;
pub use lifecycle::{PlanVersionLifecycle, VersionListQuery, VersionPage};
pub use readiness::{
    CheckKey, ReadinessCheck, ReadinessEvaluator, ReadinessReport, ReadinessStatus,
};
pub use resolver::{
    ConfigPart, ConfigResolver, ConfigStatus, EffectiveConfig, EffectiveConfigMeta,
    PublishReadiness, PublishReadinessChecks,
};
pub use wallet::{normalize_wallet_rules, WalletRuleEditor};

/// Every engine service, wired over one set of repositories.
#[derive(Debug, Clone)]
pub struct PlanEngine {
    pub lifecycle: PlanVersionLifecycle,
    pub readiness: ReadinessEvaluator,
    pub resolver: ConfigResolver,
    pub coverage: CoverageMatrixProjector,
    pub benefits: BenefitComponentEditor,
    pub wallet: WalletRuleEditor,
}

impl PlanEngine {
    pub fn new(repos: Repositories) -> Self {
        let coverage = CoverageMatrixProjector::new(repos.clone());
        let readiness = ReadinessEvaluator::new(repos.clone(), coverage.clone());
        Self {
            lifecycle: PlanVersionLifecycle::new(repos.clone(), readiness.clone()),
            resolver: ConfigResolver::new(repos.clone(), readiness.clone()),
            benefits: BenefitComponentEditor::new(repos.clone()),
            wallet: WalletRuleEditor::new(repos),
            readiness,
            coverage,
        }
    }
}
