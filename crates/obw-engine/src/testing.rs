//! Shared fixture for the engine's unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;

use obw_core::{
    ActorContext, ActorRole, BenefitKind, CategoryId, EffectiveWindow, PlanVersionNumber,
    PolicyId, ServiceCode, UserId,
};
use obw_state::PlanVersion;
use obw_store::{
    Assignment, AssignmentStatus, BenefitComponentConfig, BenefitComponentRepository,
    BenefitComponents, CoverageMatrixRepository, CoverageRow, MemoryAuditLog, MemoryStore,
    PlanVersionRepository, Policy, WalletRuleRepository, WalletRules,
};

use crate::context::Repositories;
use crate::coverage::CoverageUpdateItem;
use crate::PlanEngine;

pub(crate) fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// One policy `POL-1` with a DRAFT version 1 that starts with the policy,
/// over the reference master data.
pub(crate) struct Fixture {
    pub store: MemoryStore,
    pub audit: MemoryAuditLog,
    pub engine: PlanEngine,
    pub policy_id: PolicyId,
    pub v1: PlanVersionNumber,
    pub actor: ActorContext,
    policy_from: NaiveDate,
    members: AtomicU32,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_policy_window(d(2026, 1, 1), None)
    }

    pub fn with_policy_window(from: NaiveDate, to: Option<NaiveDate>) -> Self {
        let store = MemoryStore::with_reference_master_data().unwrap();
        let audit = MemoryAuditLog::new();
        let engine = PlanEngine::new(Repositories::from_store(
            store.clone(),
            Arc::new(audit.clone()),
        ));
        let actor = ActorContext::new("admin-1", "admin@example.com", ActorRole::Admin);
        let policy_id = PolicyId::new("POL-1").unwrap();

        store.insert_policy(Policy {
            id: policy_id.clone(),
            policy_number: "POL-1".into(),
            name: "Corporate Gold".into(),
            window: EffectiveWindow::new(from, to).unwrap(),
            current_plan_version: None,
        });
        store
            .insert_plan_version(PlanVersion::new_draft(
                policy_id.clone(),
                PlanVersionNumber::FIRST,
                EffectiveWindow::starting(from),
                &actor,
            ))
            .unwrap();

        Self {
            store,
            audit,
            engine,
            policy_id,
            v1: PlanVersionNumber::FIRST,
            actor,
            policy_from: from,
            members: AtomicU32::new(0),
        }
    }

    /// Another open-ended policy with no versions.
    pub fn add_policy(&self, id: &str) -> PolicyId {
        let policy_id = PolicyId::new(id).unwrap();
        self.store.insert_policy(Policy {
            id: policy_id.clone(),
            policy_number: id.into(),
            name: format!("Policy {id}"),
            window: EffectiveWindow::starting(self.policy_from),
            current_plan_version: None,
        });
        policy_id
    }

    pub fn draft(&self, from: NaiveDate, to: Option<NaiveDate>) -> PlanVersionNumber {
        self.engine
            .lifecycle
            .create_draft(&self.policy_id, from, to, &self.actor)
            .unwrap()
            .plan_version
    }

    /// Store components for v1 with exactly `kinds` enabled.
    pub fn enable(&self, kinds: &[BenefitKind]) {
        let components = kinds
            .iter()
            .fold(BenefitComponents::all_disabled(), |acc, kind| {
                acc.with(*kind, BenefitComponentConfig::enabled())
            });
        self.store
            .upsert_benefit_components(&self.policy_id, self.v1, components, &self.actor.id)
            .unwrap();
    }

    /// Store wallet rules for v1 through the editor.
    pub fn set_wallet(&self, rules: WalletRules) {
        self.engine
            .wallet
            .update(&self.policy_id, self.v1, rules, &self.actor)
            .unwrap();
    }

    /// Store wallet rules for v1 without validation.
    pub fn set_wallet_raw(&self, rules: WalletRules) {
        self.store
            .upsert_wallet_rules(&self.policy_id, self.v1, rules, &self.actor.id)
            .unwrap();
    }

    pub fn publish_v1_directly(&self) {
        self.publish_directly(self.v1);
    }

    /// Publish without the readiness gate.
    pub fn publish_directly(&self, version: PlanVersionNumber) {
        let actor = self.actor.clone();
        self.store
            .update_plan_version(&self.policy_id, version, &mut |pv| pv.publish(&actor))
            .unwrap();
    }

    pub fn rows(&self) -> Vec<CoverageRow> {
        self.store
            .find_coverage_rows(&self.policy_id, self.v1)
            .unwrap()
    }

    /// Wallet, consultation and its coverage: v1 passes every check.
    pub fn configure_ready_v1(&self) {
        self.set_wallet(WalletRules {
            total_annual_amount: 50_000,
            ..WalletRules::default()
        });
        self.enable(&[BenefitKind::Consultation]);
        let item = |c: &str, s: &str| CoverageUpdateItem {
            category_id: CategoryId::new(c).unwrap(),
            service_code: ServiceCode::new(s).unwrap(),
            enabled: true,
            notes: None,
        };
        self.engine
            .coverage
            .update(
                &self.policy_id,
                self.v1,
                &[item("CAT001", "CON001"), item("CAT005", "TEL001")],
                &self.actor,
            )
            .unwrap();
    }

    /// A new member with an ACTIVE assignment to `POL-1`.
    pub fn assign_member(&self, pinned: Option<PlanVersionNumber>) -> UserId {
        let n = self.members.fetch_add(1, Ordering::Relaxed) + 1;
        let user_id = UserId::new(format!("member-{n}")).unwrap();
        self.store.insert_assignment(Assignment {
            user_id: user_id.clone(),
            policy_id: self.policy_id.clone(),
            status: AssignmentStatus::Active,
            window: EffectiveWindow::starting(self.policy_from),
            plan_version: pinned,
        });
        user_id
    }
}
