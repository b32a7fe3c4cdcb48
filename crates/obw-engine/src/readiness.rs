//! # Readiness Evaluator
//!
//! Decides whether a plan version may be published. Runs five independent
//! checks in a fixed order and never short-circuits, so an administrator
//! sees every problem in one pass:
//!
//! 1. `versionStatus`: the version exists and is DRAFT.
//! 2. `dates`: the window is well-formed and lies inside the policy's.
//! 3. `walletRules`: rules exist, `totalAnnualAmount > 0`, and percentages
//!    are within 0..=100. A per-claim limit above the annual total is a
//!    warning only.
//! 4. `benefitComponents`: components exist and at least one kind is on.
//! 5. `coverageMatrix`: delegated to the coverage projector.
//!
//! The overall status is READY iff every check is ok. This is the single
//! source of truth for readiness; the resolver's legacy readiness shape is
//! a projection of this report.

use serde::{Deserialize, Serialize};

use obw_core::{PlanVersionNumber, PolicyId};
use obw_state::PlanVersion;
use obw_store::{CopayMode, Policy, WalletRuleSet};

use crate::context::Repositories;
use crate::coverage::CoverageMatrixProjector;
use crate::error::EngineError;

/// Identifies a readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckKey {
    VersionStatus,
    Dates,
    WalletRules,
    BenefitComponents,
    CoverageMatrix,
}

impl CheckKey {
    /// Evaluation order.
    pub const ORDER: [CheckKey; 5] = [
        Self::VersionStatus,
        Self::Dates,
        Self::WalletRules,
        Self::BenefitComponents,
        Self::CoverageMatrix,
    ];
}

/// Outcome of one check. `message` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessCheck {
    pub key: CheckKey,
    pub ok: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ReadinessCheck {
    pub fn pass(key: CheckKey, message: impl Into<String>) -> Self {
        Self {
            key,
            ok: true,
            message: message.into(),
            details: None,
        }
    }

    pub fn fail(key: CheckKey, message: impl Into<String>) -> Self {
        Self {
            key,
            ok: false,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Aggregate readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessStatus {
    Ready,
    Blocked,
}

/// Full itemized readiness report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub status: ReadinessStatus,
    pub checks: Vec<ReadinessCheck>,
}

impl ReadinessReport {
    /// Aggregate checks: READY iff all are ok.
    pub fn from_checks(checks: Vec<ReadinessCheck>) -> Self {
        let status = if checks.iter().all(|c| c.ok) {
            ReadinessStatus::Ready
        } else {
            ReadinessStatus::Blocked
        };
        Self { status, checks }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ReadinessStatus::Ready
    }

    pub fn check(&self, key: CheckKey) -> Option<&ReadinessCheck> {
        self.checks.iter().find(|c| c.key == key)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReadinessCheck> {
        self.checks.iter().filter(|c| !c.ok)
    }

    /// Messages of the failing checks, verbatim and in order.
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures().map(|c| c.message.clone()).collect()
    }
}

/// Runs the readiness battery.
#[derive(Debug, Clone)]
pub struct ReadinessEvaluator {
    repos: Repositories,
    coverage: CoverageMatrixProjector,
}

impl ReadinessEvaluator {
    pub fn new(repos: Repositories, coverage: CoverageMatrixProjector) -> Self {
        Self { repos, coverage }
    }

    /// Evaluate every check. Missing records fail their checks rather than
    /// the call; only store failures are returned as errors.
    pub fn evaluate(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<ReadinessReport, EngineError> {
        let policy = self.repos.policies.find_policy(policy_id)?;
        let plan_version = self
            .repos
            .plan_versions
            .find_plan_version(policy_id, version)?;
        let wallet = self.repos.wallet_rules.find_wallet_rules(policy_id, version)?;
        let components = self
            .repos
            .benefit_components
            .find_benefit_components(policy_id, version)?;

        let benefit_check = match &components {
            None => ReadinessCheck::fail(CheckKey::BenefitComponents, "Benefit components not configured"),
            Some(set) => {
                let enabled = set.components.enabled_kinds();
                if enabled.is_empty() {
                    ReadinessCheck::fail(
                        CheckKey::BenefitComponents,
                        "At least one benefit must be enabled",
                    )
                } else {
                    ReadinessCheck::pass(
                        CheckKey::BenefitComponents,
                        format!("{} benefit(s) enabled", enabled.len()),
                    )
                    .with_details(serde_json::json!({ "enabled": enabled }))
                }
            }
        };

        let checks = vec![
            version_status_check(plan_version.as_ref()),
            dates_check(policy.as_ref(), plan_version.as_ref()),
            wallet_rules_check(wallet.as_ref()),
            benefit_check,
            self.coverage.readiness_check(policy_id, version)?,
        ];
        let report = ReadinessReport::from_checks(checks);

        tracing::debug!(
            policy_id = %policy_id,
            plan_version = %version,
            ready = report.is_ready(),
            failed = report.failures().count(),
            "evaluated readiness"
        );
        Ok(report)
    }
}

fn version_status_check(plan_version: Option<&PlanVersion>) -> ReadinessCheck {
    match plan_version {
        None => ReadinessCheck::fail(CheckKey::VersionStatus, "Plan version not found"),
        Some(pv) if pv.is_draft() => {
            ReadinessCheck::pass(CheckKey::VersionStatus, "Plan version is in DRAFT")
        }
        Some(pv) => ReadinessCheck::fail(
            CheckKey::VersionStatus,
            format!("Only draft versions can be published (current status: {})", pv.status),
        ),
    }
}

fn dates_check(policy: Option<&Policy>, plan_version: Option<&PlanVersion>) -> ReadinessCheck {
    let Some(pv) = plan_version else {
        return ReadinessCheck::fail(CheckKey::Dates, "Plan version not found");
    };
    let Some(policy) = policy else {
        return ReadinessCheck::fail(CheckKey::Dates, "Policy not found");
    };

    let mut issues = Vec::new();
    if let Err(e) = pv.window.validate() {
        issues.push(e.to_string());
    }
    if pv.window.effective_from < policy.window.effective_from {
        issues.push("Plan version effective from is before policy effective from".to_string());
    }
    if let (Some(to), Some(policy_to)) = (pv.window.effective_to, policy.window.effective_to) {
        if to > policy_to {
            issues.push("Plan version effective to is after policy effective to".to_string());
        }
    }

    if issues.is_empty() {
        ReadinessCheck::pass(CheckKey::Dates, "Effective dates are within the policy window")
    } else {
        ReadinessCheck::fail(CheckKey::Dates, issues.join("; "))
            .with_details(serde_json::json!({ "issues": issues }))
    }
}

fn wallet_rules_check(wallet: Option<&WalletRuleSet>) -> ReadinessCheck {
    let Some(set) = wallet else {
        return ReadinessCheck::fail(CheckKey::WalletRules, "Wallet rules not configured");
    };
    let rules = &set.rules;

    let mut errors = Vec::new();
    if rules.total_annual_amount == 0 {
        errors.push("Total annual amount must be greater than 0".to_string());
    }
    if let Some(copay) = rules.copay {
        if copay.mode == CopayMode::Percent && copay.value > 100 {
            errors.push("Copay percentage cannot exceed 100%".to_string());
        }
    }
    if let Some(cf) = rules.carry_forward.filter(|cf| cf.enabled) {
        if cf.percent.map_or(false, |p| p > 100) {
            errors.push("Carry forward percentage cannot exceed 100%".to_string());
        }
        if cf.months == Some(0) {
            errors.push("Carry forward months must be at least 1".to_string());
        }
    }

    let mut warnings = Vec::new();
    if let Some(limit) = rules.per_claim_limit {
        if limit > rules.total_annual_amount {
            warnings.push(format!(
                "Per-claim limit {limit} exceeds total annual amount {}",
                rules.total_annual_amount
            ));
        }
    }

    let check = if errors.is_empty() {
        ReadinessCheck::pass(CheckKey::WalletRules, "Wallet rules configured")
    } else {
        ReadinessCheck::fail(CheckKey::WalletRules, errors.join("; "))
    };
    if warnings.is_empty() {
        check
    } else {
        check.with_details(serde_json::json!({ "warnings": warnings }))
    }
}
