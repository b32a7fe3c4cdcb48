//! # Effective Configuration Resolver
//!
//! Merges a plan version's sub-configurations into one canonical view.
//! Absent documents are replaced by explicit defaults, so callers always
//! receive all eight benefit kinds and a complete wallet body; `meta`
//! records which documents were missing.
//!
//! The member path resolves the effective version
//! (`assignment.planVersion`, then `policy.currentPlanVersion`, then 1) and
//! delegates to the admin path, so both views agree by construction.

use serde::{Deserialize, Serialize};

use obw_core::{PlanVersionNumber, PolicyId, Timestamp, UserId};
use obw_store::{BenefitComponents, WalletRules};

use crate::context::{Repositories, VersionSource};
use crate::error::EngineError;
use crate::readiness::{CheckKey, ReadinessEvaluator};

/// A sub-configuration that may be missing from a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigPart {
    BenefitComponents,
    WalletRules,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigStatus {
    Complete,
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfigMeta {
    /// Resolution time. Never cached.
    #[serde(rename = "generatedAtISO")]
    pub generated_at_iso: String,
    pub status: ConfigStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<ConfigPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_source: Option<VersionSource>,
}

/// The merged configuration of one plan version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    pub policy_id: PolicyId,
    pub plan_version: PlanVersionNumber,
    pub benefits: BenefitComponents,
    pub wallet: WalletRules,
    pub meta: EffectiveConfigMeta,
}

impl EffectiveConfig {
    pub fn is_complete(&self) -> bool {
        self.meta.status == ConfigStatus::Complete
    }
}

/// Boolean summary of a readiness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReadinessChecks {
    pub has_benefit_components: bool,
    pub has_wallet_rules: bool,
    pub has_valid_dates: bool,
    pub has_valid_wallet_config: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReadiness {
    pub is_ready: bool,
    pub checks: PublishReadinessChecks,
}

#[derive(Debug, Clone)]
pub struct ConfigResolver {
    repos: Repositories,
    readiness: ReadinessEvaluator,
}

impl ConfigResolver {
    pub fn new(repos: Repositories, readiness: ReadinessEvaluator) -> Self {
        Self { repos, readiness }
    }

    /// Effective configuration of a stored plan version.
    pub fn resolve_for_admin(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<EffectiveConfig, EngineError> {
        self.repos.require_plan_version(policy_id, version)?;

        let components = self
            .repos
            .benefit_components
            .find_benefit_components(policy_id, version)?;
        let wallet = self.repos.wallet_rules.find_wallet_rules(policy_id, version)?;

        let mut missing = Vec::new();
        if components.is_none() {
            missing.push(ConfigPart::BenefitComponents);
        }
        if wallet.is_none() {
            missing.push(ConfigPart::WalletRules);
        }
        let status = if missing.is_empty() {
            ConfigStatus::Complete
        } else {
            ConfigStatus::Incomplete
        };

        tracing::debug!(
            policy_id = %policy_id,
            plan_version = %version,
            missing = ?missing,
            "resolved effective config"
        );

        Ok(EffectiveConfig {
            policy_id: policy_id.clone(),
            plan_version: version,
            benefits: components
                .map(|set| set.components)
                .unwrap_or_else(BenefitComponents::all_disabled),
            wallet: wallet.map(|set| set.rules).unwrap_or_default(),
            meta: EffectiveConfigMeta {
                generated_at_iso: Timestamp::now().to_iso8601(),
                status,
                missing,
                version_source: None,
            },
        })
    }

    /// Effective configuration for a member, resolved through their ACTIVE
    /// assignment.
    pub fn resolve_for_member(&self, user_id: &UserId) -> Result<EffectiveConfig, EngineError> {
        let member = self.repos.resolve_member_version(user_id)?.ok_or_else(|| {
            EngineError::NotFound("No policy assignment found for member".into())
        })?;
        let mut config = self.resolve_for_admin(&member.policy.id, member.version)?;
        config.meta.version_source = Some(member.source);
        Ok(config)
    }

    /// The readiness report reduced to four booleans and the first failure
    /// message. `is_ready` is the report's own verdict.
    pub fn check_publish_readiness(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<PublishReadiness, EngineError> {
        let exists = self.repos.policies.find_policy(policy_id)?.is_some()
            && self
                .repos
                .plan_versions
                .find_plan_version(policy_id, version)?
                .is_some();
        if !exists {
            return Err(EngineError::NotFound(
                "Plan version or policy not found".into(),
            ));
        }

        let wallet_present = self
            .repos
            .wallet_rules
            .find_wallet_rules(policy_id, version)?
            .is_some();
        let report = self.readiness.evaluate(policy_id, version)?;
        let ok = |key| report.check(key).map_or(false, |c| c.ok);
        let first_failure = report.failures().next().map(|c| c.message.clone());

        Ok(PublishReadiness {
            is_ready: report.is_ready(),
            checks: PublishReadinessChecks {
                has_benefit_components: ok(CheckKey::BenefitComponents),
                has_wallet_rules: wallet_present,
                has_valid_dates: ok(CheckKey::Dates),
                has_valid_wallet_config: ok(CheckKey::WalletRules),
                message: first_failure,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{d, Fixture};
    use obw_core::BenefitKind;

    #[test]
    fn test_unconfigured_version_resolves_to_defaults() {
        let fx = Fixture::new();
        let config = fx.engine.resolver.resolve_for_admin(&fx.policy_id, fx.v1).unwrap();
        assert_eq!(config.benefits, BenefitComponents::all_disabled());
        assert_eq!(config.wallet.total_annual_amount, 0);
        assert!(!config.wallet.partial_payment_enabled);
        assert!(!config.wallet.top_up_allowed);
        assert_eq!(config.meta.status, ConfigStatus::Incomplete);
        assert_eq!(
            config.meta.missing,
            vec![ConfigPart::BenefitComponents, ConfigPart::WalletRules]
        );
    }

    #[test]
    fn test_default_benefits_serialize_every_kind() {
        let fx = Fixture::new();
        let config = fx.engine.resolver.resolve_for_admin(&fx.policy_id, fx.v1).unwrap();
        let json = serde_json::to_value(&config).unwrap();
        for kind in BenefitKind::all() {
            assert_eq!(json["benefits"][kind.as_str()]["enabled"], false, "{kind:?}");
        }
        assert_eq!(json["meta"]["status"], "incomplete");
        assert!(json["meta"]["generatedAtISO"].is_string());
        assert_eq!(json["meta"]["missing"][1], "walletRules");
    }

    #[test]
    fn test_configured_version_is_complete() {
        let fx = Fixture::new();
        fx.configure_ready_v1();
        let config = fx.engine.resolver.resolve_for_admin(&fx.policy_id, fx.v1).unwrap();
        assert!(config.is_complete());
        assert!(config.meta.missing.is_empty());
        assert_eq!(config.wallet.total_annual_amount, 50_000);
        assert!(config.benefits.consultation.enabled);
    }

    #[test]
    fn test_unknown_version_is_not_found() {
        let fx = Fixture::new();
        let err = fx
            .engine
            .resolver
            .resolve_for_admin(&fx.policy_id, PlanVersionNumber::new(4).unwrap())
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_member_without_assignment_is_not_found() {
        let fx = Fixture::new();
        let err = fx
            .engine
            .resolver
            .resolve_for_member(&UserId::new("ghost").unwrap())
            .unwrap_err();
        assert!(
            matches!(err, EngineError::NotFound(ref m) if m == "No policy assignment found for member")
        );
    }

    #[test]
    fn test_member_override_beats_policy_current() {
        let fx = Fixture::new();
        fx.publish_v1_directly();
        let v2 = fx.draft(d(2026, 2, 1), None);
        fx.publish_directly(v2);
        fx.engine
            .lifecycle
            .make_current_on(&fx.policy_id, v2, &fx.actor, d(2026, 3, 1))
            .unwrap();

        let pinned = fx.assign_member(Some(fx.v1));
        let config = fx.engine.resolver.resolve_for_member(&pinned).unwrap();
        assert_eq!(config.plan_version, fx.v1);
        assert_eq!(config.meta.version_source, Some(VersionSource::AssignmentOverride));

        let floating = fx.assign_member(None);
        let config = fx.engine.resolver.resolve_for_member(&floating).unwrap();
        assert_eq!(config.plan_version, v2);
        assert_eq!(config.meta.version_source, Some(VersionSource::PolicyCurrent));
    }

    #[test]
    fn test_member_falls_back_to_version_one() {
        let fx = Fixture::new();
        let member = fx.assign_member(None);
        let config = fx.engine.resolver.resolve_for_member(&member).unwrap();
        assert_eq!(config.plan_version, PlanVersionNumber::FIRST);
        assert_eq!(config.meta.version_source, Some(VersionSource::Fallback));
    }

    #[test]
    fn test_publish_readiness_agrees_with_report() {
        let fx = Fixture::new();
        let summary = fx
            .engine
            .resolver
            .check_publish_readiness(&fx.policy_id, fx.v1)
            .unwrap();
        assert!(!summary.is_ready);
        assert!(!summary.checks.has_wallet_rules);
        assert!(!summary.checks.has_benefit_components);
        assert!(summary.checks.has_valid_dates);
        assert_eq!(
            summary.checks.message.as_deref(),
            Some("Wallet rules not configured")
        );

        fx.configure_ready_v1();
        let summary = fx
            .engine
            .resolver
            .check_publish_readiness(&fx.policy_id, fx.v1)
            .unwrap();
        let report = fx.engine.readiness.evaluate(&fx.policy_id, fx.v1).unwrap();
        assert_eq!(summary.is_ready, report.is_ready());
        assert!(summary.is_ready);
        assert!(summary.checks.message.is_none());
    }

    #[test]
    fn test_publish_readiness_flags_invalid_wallet() {
        let fx = Fixture::new();
        fx.set_wallet_raw(WalletRules {
            total_annual_amount: 100,
            copay: Some(obw_store::Copay {
                mode: obw_store::CopayMode::Percent,
                value: 130,
            }),
            ..WalletRules::default()
        });
        let summary = fx
            .engine
            .resolver
            .check_publish_readiness(&fx.policy_id, fx.v1)
            .unwrap();
        assert!(summary.checks.has_wallet_rules);
        assert!(!summary.checks.has_valid_wallet_config);
        assert!(!summary.is_ready);
    }

    #[test]
    fn test_publish_readiness_unknown_version() {
        let fx = Fixture::new();
        let err = fx
            .engine
            .resolver
            .check_publish_readiness(&fx.policy_id, PlanVersionNumber::new(3).unwrap())
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(ref m) if m == "Plan version or policy not found"));
    }
}
