//! Shared repository handles and the lookups every service repeats.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use obw_core::{PlanVersionNumber, PolicyId, UserId};
use obw_state::PlanVersion;
use obw_store::{
    record_or_warn, Assignment, AssignmentRepository, AuditEvent, AuditSink,
    BenefitComponentRepository, CoverageMatrixRepository, MasterDataRepository, MemoryStore,
    PlanVersionRepository, Policy, PolicyRepository, WalletRuleRepository,
};

use crate::error::EngineError;

/// Handles to every collaborator the engine consumes.
#[derive(Clone)]
pub struct Repositories {
    pub policies: Arc<dyn PolicyRepository>,
    pub plan_versions: Arc<dyn PlanVersionRepository>,
    pub benefit_components: Arc<dyn BenefitComponentRepository>,
    pub wallet_rules: Arc<dyn WalletRuleRepository>,
    pub coverage: Arc<dyn CoverageMatrixRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub master_data: Arc<dyn MasterDataRepository>,
    pub audit: Arc<dyn AuditSink>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

impl Repositories {
    /// Every repository backed by one shared [`MemoryStore`].
    pub fn from_store(store: MemoryStore, audit: Arc<dyn AuditSink>) -> Self {
        let store = Arc::new(store);
        Self {
            policies: store.clone(),
            plan_versions: store.clone(),
            benefit_components: store.clone(),
            wallet_rules: store.clone(),
            coverage: store.clone(),
            assignments: store.clone(),
            master_data: store,
            audit,
        }
    }

    pub(crate) fn require_policy(&self, id: &PolicyId) -> Result<Policy, EngineError> {
        self.policies
            .find_policy(id)?
            .ok_or_else(|| EngineError::NotFound("Policy not found".into()))
    }

    pub(crate) fn require_plan_version(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<PlanVersion, EngineError> {
        self.plan_versions
            .find_plan_version(policy_id, version)?
            .ok_or_else(|| {
                EngineError::NotFound(format!(
                    "Plan version {version} not found for this policy"
                ))
            })
    }

    /// Policy and version both present, or NotFound.
    pub(crate) fn require_policy_and_version(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<(Policy, PlanVersion), EngineError> {
        let policy = self.require_policy(policy_id)?;
        let plan_version = self.require_plan_version(policy_id, version)?;
        Ok((policy, plan_version))
    }

    pub(crate) fn audit(&self, event: AuditEvent) {
        record_or_warn(self.audit.as_ref(), event);
    }

    /// Work out which plan version applies to a member. `None` when the
    /// member has no ACTIVE assignment.
    pub fn resolve_member_version(
        &self,
        user_id: &UserId,
    ) -> Result<Option<MemberVersion>, EngineError> {
        let Some(assignment) = self.assignments.find_active_for_user(user_id)? else {
            return Ok(None);
        };
        let policy = self.require_policy(&assignment.policy_id)?;
        let (version, source) = match (assignment.plan_version, policy.current_plan_version) {
            (Some(pinned), _) => (pinned, VersionSource::AssignmentOverride),
            (None, Some(current)) => (current, VersionSource::PolicyCurrent),
            (None, None) => (PlanVersionNumber::FIRST, VersionSource::Fallback),
        };
        Ok(Some(MemberVersion {
            assignment,
            policy,
            version,
            source,
        }))
    }
}

/// Which input chose a member's effective version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VersionSource {
    /// The assignment pins a version.
    AssignmentOverride,
    /// The policy's current version.
    PolicyCurrent,
    /// Neither is set; version 1.
    Fallback,
}

/// A member's effective policy and version.
#[derive(Debug, Clone)]
pub struct MemberVersion {
    pub assignment: Assignment,
    pub policy: Policy,
    pub version: PlanVersionNumber,
    pub source: VersionSource,
}
