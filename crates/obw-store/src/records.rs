//! # Persisted Records
//!
//! The documents the engine reads and writes. Policies, assignments and
//! master data are owned by other subsystems and are read-only here; the
//! three sub-configuration documents (benefit components, wallet rules,
//! coverage rows) are keyed by `(policyId, planVersion)` and are written
//! only while the owning plan version is DRAFT.

use serde::{Deserialize, Serialize};

use obw_core::{
    BenefitKind, CategoryId, EffectiveWindow, PlanVersionNumber, PolicyId, ServiceCode, Timestamp,
    UserId,
};

// ─── Policy ──────────────────────────────────────────────────────────

/// A corporate policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: PolicyId,
    pub policy_number: String,
    pub name: String,
    #[serde(flatten)]
    pub window: EffectiveWindow,
    /// Version used for members without an override. Changed only by
    /// the lifecycle's make-current operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_plan_version: Option<PlanVersionNumber>,
}

// ─── Assignment ──────────────────────────────────────────────────────

/// Assignment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Active,
    Ended,
}

/// Links a member to a policy, optionally pinning a plan version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub user_id: UserId,
    pub policy_id: PolicyId,
    pub status: AssignmentStatus,
    #[serde(flatten)]
    pub window: EffectiveWindow,
    /// Version override. Takes precedence over the policy's current version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_version: Option<PlanVersionNumber>,
}

// ─── Master Data ─────────────────────────────────────────────────────

/// A coverage category (master data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: CategoryId,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    #[serde(default)]
    pub display_order: u32,
}

/// A service under a category (master data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub service_code: ServiceCode,
    pub service_name: String,
    pub category_id: CategoryId,
    pub is_active: bool,
    #[serde(default)]
    pub display_order: u32,
}

// ─── Benefit Components ──────────────────────────────────────────────

/// Configuration of one benefit kind.
///
/// Limit fields only carry meaning for the kinds where
/// [`BenefitKind::has_limits`] holds; `includes_fasting` only for `ahc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitComponentConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_amount_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visits_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes_fasting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BenefitComponentConfig {
    /// An enabled component with no limits.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }
}

/// The eight benefit kinds of a plan version. A kind missing from a stored
/// document deserializes as disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitComponents {
    #[serde(default)]
    pub consultation: BenefitComponentConfig,
    #[serde(default)]
    pub pharmacy: BenefitComponentConfig,
    #[serde(default)]
    pub diagnostics: BenefitComponentConfig,
    #[serde(default)]
    pub ahc: BenefitComponentConfig,
    #[serde(default)]
    pub vaccination: BenefitComponentConfig,
    #[serde(default)]
    pub dental: BenefitComponentConfig,
    #[serde(default)]
    pub vision: BenefitComponentConfig,
    #[serde(default)]
    pub wellness: BenefitComponentConfig,
}

impl BenefitComponents {
    /// Every kind disabled. The one definition of "no benefits".
    pub fn all_disabled() -> Self {
        Self::default()
    }

    /// Configuration for `kind`.
    pub fn get(&self, kind: BenefitKind) -> &BenefitComponentConfig {
        match kind {
            BenefitKind::Consultation => &self.consultation,
            BenefitKind::Pharmacy => &self.pharmacy,
            BenefitKind::Diagnostics => &self.diagnostics,
            BenefitKind::Ahc => &self.ahc,
            BenefitKind::Vaccination => &self.vaccination,
            BenefitKind::Dental => &self.dental,
            BenefitKind::Vision => &self.vision,
            BenefitKind::Wellness => &self.wellness,
        }
    }

    /// Mutable configuration for `kind`.
    pub fn get_mut(&mut self, kind: BenefitKind) -> &mut BenefitComponentConfig {
        match kind {
            BenefitKind::Consultation => &mut self.consultation,
            BenefitKind::Pharmacy => &mut self.pharmacy,
            BenefitKind::Diagnostics => &mut self.diagnostics,
            BenefitKind::Ahc => &mut self.ahc,
            BenefitKind::Vaccination => &mut self.vaccination,
            BenefitKind::Dental => &mut self.dental,
            BenefitKind::Vision => &mut self.vision,
            BenefitKind::Wellness => &mut self.wellness,
        }
    }

    /// Builder-style: replace the configuration for `kind`.
    pub fn with(mut self, kind: BenefitKind, config: BenefitComponentConfig) -> Self {
        *self.get_mut(kind) = config;
        self
    }

    /// Kinds with `enabled == true`, in canonical order.
    pub fn enabled_kinds(&self) -> Vec<BenefitKind> {
        BenefitKind::all()
            .iter()
            .copied()
            .filter(|k| self.get(*k).enabled)
            .collect()
    }

    /// Whether at least one kind is enabled.
    pub fn any_enabled(&self) -> bool {
        BenefitKind::all().iter().any(|k| self.get(*k).enabled)
    }
}

/// Persisted benefit component document for a plan version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitComponentSet {
    pub policy_id: PolicyId,
    pub plan_version: PlanVersionNumber,
    pub components: BenefitComponents,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl BenefitComponentSet {
    /// The value that stands in for an absent document: every kind
    /// disabled, no audit fields.
    pub fn default_for(policy_id: PolicyId, plan_version: PlanVersionNumber) -> Self {
        Self {
            policy_id,
            plan_version,
            components: BenefitComponents::all_disabled(),
            created_by: None,
            updated_by: None,
            created_at: None,
            updated_at: None,
        }
    }
}

// ─── Wallet Rules ────────────────────────────────────────────────────

/// How a copay is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CopayMode {
    Percent,
    Amount,
}

/// Member copay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Copay {
    pub mode: CopayMode,
    pub value: u64,
}

/// Unused balance carry-forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryForward {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
}

/// The editable body of a wallet rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRules {
    #[serde(default)]
    pub total_annual_amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_claim_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copay: Option<Copay>,
    #[serde(default)]
    pub partial_payment_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carry_forward: Option<CarryForward>,
    #[serde(default)]
    pub top_up_allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Persisted wallet rule document for a plan version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRuleSet {
    pub policy_id: PolicyId,
    pub plan_version: PlanVersionNumber,
    #[serde(flatten)]
    pub rules: WalletRules,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ─── Coverage ────────────────────────────────────────────────────────

/// One persisted coverage row, keyed by `(categoryId, serviceCode)`
/// within a plan version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRow {
    pub category_id: CategoryId,
    pub service_code: ServiceCode,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub updated_by: String,
}

/// A single row write in a coverage batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageWrite {
    pub category_id: CategoryId,
    pub service_code: ServiceCode,
    pub enabled: bool,
    /// Replacement notes. `None` leaves stored notes untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
