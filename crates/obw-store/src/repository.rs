//! # Repository Contracts
//!
//! The collaborator contracts the engine consumes. All methods are
//! synchronous and request-scoped; implementations must be `Send + Sync`
//! so one store can be shared behind an `Arc` by every request.
//!
//! ## Write guards
//!
//! The three sub-configuration upserts must re-check, inside the same
//! critical section as the write, that the owning plan version is still
//! DRAFT, and fail with [`StoreError::NotEditable`] otherwise. That closes
//! the window between the engine's validation pass and the write, so a
//! concurrent publish cannot be followed by a late edit.

use obw_core::{CategoryId, PlanVersionNumber, PolicyId, UserId};
use obw_state::{PlanVersion, PlanVersionError, PlanVersionStatus};

use crate::error::StoreError;
use crate::records::{
    Assignment, BenefitComponentSet, BenefitComponents, Category, CoverageRow, CoverageWrite,
    Policy, Service, WalletRuleSet, WalletRules,
};

/// Result of an upsert: the document before the write (absent on first
/// insert) and after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted<T> {
    pub before: Option<T>,
    pub after: T,
}

impl<T> Upserted<T> {
    /// Whether the write created the document.
    pub fn created(&self) -> bool {
        self.before.is_none()
    }
}

/// Policies.
pub trait PolicyRepository: Send + Sync {
    fn find_policy(&self, id: &PolicyId) -> Result<Option<Policy>, StoreError>;

    /// Repoint the policy's current version, returning the previous value.
    fn update_current_version(
        &self,
        id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<Option<PlanVersionNumber>, StoreError>;
}

/// Plan versions, unique on `(policyId, planVersion)`.
pub trait PlanVersionRepository: Send + Sync {
    fn find_plan_version(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<Option<PlanVersion>, StoreError>;

    /// Highest version number for the policy, `0` when it has none.
    fn find_max_version(&self, policy_id: &PolicyId) -> Result<u32, StoreError>;

    /// Insert a new version. Fails with [`StoreError::Duplicate`] if the
    /// key is taken.
    fn insert_plan_version(&self, version: PlanVersion) -> Result<(), StoreError>;

    /// Atomically read-modify-write a version. The closure runs under the
    /// store's write lock; its error aborts the write.
    fn update_plan_version(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        apply: &mut dyn FnMut(&mut PlanVersion) -> Result<(), PlanVersionError>,
    ) -> Result<PlanVersion, StoreError>;

    /// All versions of a policy, newest first, optionally filtered by status.
    fn list_plan_versions(
        &self,
        policy_id: &PolicyId,
        status: Option<PlanVersionStatus>,
    ) -> Result<Vec<PlanVersion>, StoreError>;
}

/// Benefit component documents.
pub trait BenefitComponentRepository: Send + Sync {
    fn find_benefit_components(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<Option<BenefitComponentSet>, StoreError>;

    /// Create or replace the components. `createdBy`/`createdAt` are set
    /// only on first insert.
    fn upsert_benefit_components(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        components: BenefitComponents,
        actor_id: &str,
    ) -> Result<Upserted<BenefitComponentSet>, StoreError>;
}

/// Wallet rule documents.
pub trait WalletRuleRepository: Send + Sync {
    fn find_wallet_rules(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<Option<WalletRuleSet>, StoreError>;

    /// Create or replace the rules. `createdBy`/`createdAt` are set only on
    /// first insert.
    fn upsert_wallet_rules(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        rules: WalletRules,
        actor_id: &str,
    ) -> Result<Upserted<WalletRuleSet>, StoreError>;
}

/// Sparse coverage rows, unique on
/// `(policyId, planVersion, categoryId, serviceCode)`.
pub trait CoverageMatrixRepository: Send + Sync {
    fn find_coverage_rows(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<Vec<CoverageRow>, StoreError>;

    /// Apply every write or none. Returns the number of rows written.
    fn upsert_coverage_rows(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        writes: &[CoverageWrite],
        actor_id: &str,
    ) -> Result<usize, StoreError>;
}

/// Member assignments.
pub trait AssignmentRepository: Send + Sync {
    /// The member's ACTIVE assignment, if any.
    fn find_active_for_user(&self, user_id: &UserId) -> Result<Option<Assignment>, StoreError>;
}

/// Category and service master data (read-only).
pub trait MasterDataRepository: Send + Sync {
    /// Active categories ordered by `displayOrder`, restricted to `ids`
    /// when given.
    fn find_active_categories(
        &self,
        ids: Option<&[CategoryId]>,
    ) -> Result<Vec<Category>, StoreError>;

    /// Active services under `category_ids`, ordered by `displayOrder`.
    /// `search_text` is a case-insensitive substring match on code or name.
    fn find_active_services(
        &self,
        category_ids: &[CategoryId],
        search_text: Option<&str>,
    ) -> Result<Vec<Service>, StoreError>;
}
