//! Wallet rule editor.

use obw_core::{ActorContext, PlanVersionNumber, PolicyId, UserId, ValidationError};
use obw_store::{AuditAction, AuditEvent, CopayMode, WalletRuleSet, WalletRules};

use crate::context::Repositories;
use crate::error::EngineError;

const DEFAULT_CARRY_FORWARD_PERCENT: u32 = 100;
const DEFAULT_CARRY_FORWARD_MONTHS: u32 = 3;

/// Validate and fill defaults on an incoming rule body.
///
/// A PERCENT copay and a carry-forward percent must not exceed 100. An
/// enabled carry-forward gets 100% and 3 months when either is left out;
/// an explicit month count must be at least 1.
pub fn normalize_wallet_rules(mut rules: WalletRules) -> Result<WalletRules, ValidationError> {
    if let Some(copay) = rules.copay {
        if copay.mode == CopayMode::Percent && copay.value > 100 {
            return Err(ValidationError::PercentOutOfRange {
                field: "copay",
                value: u32::try_from(copay.value).unwrap_or(u32::MAX),
            });
        }
    }
    if let Some(cf) = rules.carry_forward.as_mut() {
        if let Some(percent) = cf.percent.filter(|p| *p > 100) {
            return Err(ValidationError::PercentOutOfRange {
                field: "carryForward",
                value: percent,
            });
        }
        if let Some(months) = cf.months.filter(|m| *m < 1) {
            return Err(ValidationError::BelowMinimum {
                field: "carryForward.months",
                min: 1,
                value: months,
            });
        }
        if cf.enabled {
            cf.percent.get_or_insert(DEFAULT_CARRY_FORWARD_PERCENT);
            cf.months.get_or_insert(DEFAULT_CARRY_FORWARD_MONTHS);
        }
    }
    Ok(rules)
}

#[derive(Debug, Clone)]
pub struct WalletRuleEditor {
    repos: Repositories,
}

impl WalletRuleEditor {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Stored rules; `None` when the version has none yet.
    pub fn get(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<Option<WalletRuleSet>, EngineError> {
        self.repos.require_policy_and_version(policy_id, version)?;
        Ok(self.repos.wallet_rules.find_wallet_rules(policy_id, version)?)
    }

    /// Replace the rules of a DRAFT version.
    pub fn update(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        rules: WalletRules,
        actor: &ActorContext,
    ) -> Result<WalletRuleSet, EngineError> {
        let (policy, plan_version) = self.repos.require_policy_and_version(policy_id, version)?;
        if !plan_version.is_draft() {
            return Err(EngineError::Conflict(format!(
                "Cannot edit wallet rules for {} plan versions",
                plan_version.status.as_str().to_lowercase()
            )));
        }
        let rules = normalize_wallet_rules(rules)?;

        let upserted =
            self.repos
                .wallet_rules
                .upsert_wallet_rules(policy_id, version, rules, &actor.id)?;

        tracing::info!(
            policy_id = %policy_id,
            plan_version = %version,
            actor = %actor.id,
            total_annual_amount = upserted.after.rules.total_annual_amount,
            created = upserted.created(),
            "wallet rules saved"
        );
        self.repos.audit(
            AuditEvent::new(
                actor,
                AuditAction::WalletRulesUpsert,
                "walletRules",
                format!("{policy_id}/v{version}"),
                format!(
                    "Updated wallet rules for policy {} version {version}",
                    policy.policy_number
                ),
            )
            .with_before(upserted.before.as_ref())
            .with_after(&upserted.after),
        );
        Ok(upserted.after)
    }

    /// Rules of a member's effective version; `None` without an ACTIVE
    /// assignment or when the version has no rules.
    pub fn get_for_member(&self, user_id: &UserId) -> Result<Option<WalletRuleSet>, EngineError> {
        match self.repos.resolve_member_version(user_id)? {
            Some(member) => Ok(self
                .repos
                .wallet_rules
                .find_wallet_rules(&member.policy.id, member.version)?),
            None => Ok(None),
        }
    }
}
