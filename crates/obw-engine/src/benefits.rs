//! Benefit component editor.
//!
//! Reads always yield a full component set: an absent document is replaced
//! by [`BenefitComponentSet::default_for`], the one definition of "every
//! benefit disabled".

use obw_core::{ActorContext, PlanVersionNumber, PolicyId, UserId};
use obw_store::{AuditAction, AuditEvent, BenefitComponentSet, BenefitComponents};

use crate::context::Repositories;
use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct BenefitComponentEditor {
    repos: Repositories,
}

impl BenefitComponentEditor {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Stored components, or the all-disabled default.
    pub fn get(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<BenefitComponentSet, EngineError> {
        self.repos.require_policy_and_version(policy_id, version)?;
        self.load_or_default(policy_id, version)
    }

    /// Replace the components of a DRAFT version.
    pub fn update(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        components: BenefitComponents,
        actor: &ActorContext,
    ) -> Result<BenefitComponentSet, EngineError> {
        let (policy, plan_version) = self.repos.require_policy_and_version(policy_id, version)?;
        if !plan_version.is_draft() {
            return Err(EngineError::Conflict(format!(
                "Cannot edit benefit components for {} plan versions",
                plan_version.status.as_str().to_lowercase()
            )));
        }

        let upserted = self.repos.benefit_components.upsert_benefit_components(
            policy_id,
            version,
            components,
            &actor.id,
        )?;

        tracing::info!(
            policy_id = %policy_id,
            plan_version = %version,
            actor = %actor.id,
            enabled = ?upserted.after.components.enabled_kinds(),
            created = upserted.created(),
            "benefit components saved"
        );
        self.repos.audit(
            AuditEvent::new(
                actor,
                AuditAction::BenefitComponentsUpsert,
                "benefitComponents",
                format!("{policy_id}/v{version}"),
                format!(
                    "Updated benefit components for policy {} version {version}",
                    policy.policy_number
                ),
            )
            .with_before(upserted.before.as_ref())
            .with_after(&upserted.after),
        );
        Ok(upserted.after)
    }

    /// Components of a member's effective version. Members without an
    /// ACTIVE assignment see every benefit disabled.
    pub fn get_for_member(&self, user_id: &UserId) -> Result<BenefitComponents, EngineError> {
        match self.repos.resolve_member_version(user_id)? {
            Some(member) => Ok(self
                .load_or_default(&member.policy.id, member.version)?
                .components),
            None => Ok(BenefitComponents::all_disabled()),
        }
    }

    fn load_or_default(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<BenefitComponentSet, EngineError> {
        Ok(self
            .repos
            .benefit_components
            .find_benefit_components(policy_id, version)?
            .unwrap_or_else(|| BenefitComponentSet::default_for(policy_id.clone(), version)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use obw_core::BenefitKind;
    use obw_store::BenefitComponentConfig;

    #[test]
    fn test_get_without_document_returns_all_disabled() {
        let fx = Fixture::new();
        let set = fx.engine.benefits.get(&fx.policy_id, fx.v1).unwrap();
        assert!(!set.components.any_enabled());
        assert!(set.created_by.is_none());
    }

    #[test]
    fn test_get_unknown_version_is_not_found() {
        let fx = Fixture::new();
        let v5 = PlanVersionNumber::new(5).unwrap();
        let err = fx.engine.benefits.get(&fx.policy_id, v5).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(ref m) if m == "Plan version 5 not found for this policy"));
    }

    #[test]
    fn test_update_upserts_and_audits() {
        let fx = Fixture::new();
        let components = BenefitComponents::all_disabled().with(
            BenefitKind::Consultation,
            BenefitComponentConfig {
                enabled: true,
                visits_limit: Some(10),
                ..BenefitComponentConfig::default()
            },
        );
        let saved = fx
            .engine
            .benefits
            .update(&fx.policy_id, fx.v1, components, &fx.actor)
            .unwrap();
        assert_eq!(saved.created_by.as_deref(), Some("admin-1"));
        assert_eq!(saved.components.consultation.visits_limit, Some(10));

        let events = fx.audit.events();
        let last = events.last().unwrap();
        assert_eq!(last.action, AuditAction::BenefitComponentsUpsert);
        assert!(last.before.is_none());
        assert!(last.after.is_some());
    }

    #[test]
    fn test_update_published_version_conflicts_without_write() {
        let fx = Fixture::new();
        fx.publish_v1_directly();
        let err = fx
            .engine
            .benefits
            .update(&fx.policy_id, fx.v1, BenefitComponents::default(), &fx.actor)
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(ref m) if m.contains("published")));
        let set = fx.engine.benefits.get(&fx.policy_id, fx.v1).unwrap();
        assert!(set.created_by.is_none());
    }

    #[test]
    fn test_member_without_assignment_gets_default() {
        let fx = Fixture::new();
        let components = fx
            .engine
            .benefits
            .get_for_member(&UserId::new("nobody").unwrap())
            .unwrap();
        assert!(!components.any_enabled());
    }

    #[test]
    fn test_member_sees_effective_version_components() {
        let fx = Fixture::new();
        fx.enable(&[BenefitKind::Vision]);
        let member = fx.assign_member(None);
        let components = fx.engine.benefits.get_for_member(&member).unwrap();
        assert_eq!(components.enabled_kinds(), vec![BenefitKind::Vision]);
    }
}
