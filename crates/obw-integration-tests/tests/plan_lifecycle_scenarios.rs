//! # Plan Version Lifecycle Scenarios
//!
//! Drives the engine end to end over the in-memory store: configure a
//! draft, pass the readiness gate, publish, then verify that the published
//! version is frozen and that members resolve the right version.

use std::sync::Arc;

use chrono::NaiveDate;

use obw_core::{
    ActorContext, ActorRole, BenefitKind, CategoryId, EffectiveWindow, PlanVersionNumber,
    PolicyId, ServiceCode, UserId,
};
use obw_engine::{
    CheckKey, ConfigStatus, CoverageFilters, CoverageUpdateItem, EngineError, PlanEngine,
    ReadinessStatus, Repositories, VersionSource,
};
use obw_state::PlanVersionStatus;
use obw_store::{
    Assignment, AssignmentStatus, AuditAction, AuditEvent, AuditSink, BenefitComponentConfig,
    BenefitComponents, Category, CoverageMatrixRepository, MemoryAuditLog, MemoryStore, Policy,
    Service, StoreError, WalletRules,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn cat(id: &str) -> CategoryId {
    CategoryId::new(id).unwrap()
}

fn svc(code: &str) -> ServiceCode {
    ServiceCode::new(code).unwrap()
}

struct World {
    store: MemoryStore,
    audit: MemoryAuditLog,
    engine: PlanEngine,
    policy: PolicyId,
    admin: ActorContext,
}

/// Policy `P1` over a consultation-only catalogue with one active service
/// in each consultation category: CAT001/CON001 and CAT005/TEL001.
fn world() -> World {
    let store = MemoryStore::new();
    store.insert_category(Category {
        category_id: cat("CAT001"),
        code: "CLINIC_CONSULT".into(),
        name: "Clinic Consultation".into(),
        is_active: true,
        display_order: 1,
    });
    store.insert_category(Category {
        category_id: cat("CAT005"),
        code: "ONLINE_CONSULT".into(),
        name: "Online Consultation".into(),
        is_active: true,
        display_order: 5,
    });
    store.insert_service(Service {
        service_code: svc("CON001"),
        service_name: "General Physician".into(),
        category_id: cat("CAT001"),
        is_active: true,
        display_order: 1,
    });
    store.insert_service(Service {
        service_code: svc("TEL001"),
        service_name: "Video Consultation".into(),
        category_id: cat("CAT005"),
        is_active: true,
        display_order: 1,
    });

    let policy = PolicyId::new("P1").unwrap();
    store.insert_policy(Policy {
        id: policy.clone(),
        policy_number: "P1".into(),
        name: "Scenario Policy".into(),
        window: EffectiveWindow::starting(d(2026, 1, 1)),
        current_plan_version: None,
    });

    let audit = MemoryAuditLog::new();
    let engine = PlanEngine::new(Repositories::from_store(
        store.clone(),
        Arc::new(audit.clone()),
    ));
    let admin = ActorContext::new("admin-7", "admin@corp.test", ActorRole::Admin);
    World {
        store,
        audit,
        engine,
        policy,
        admin,
    }
}

impl World {
    fn create_v(&self, from: NaiveDate) -> PlanVersionNumber {
        self.engine
            .lifecycle
            .create_draft(&self.policy, from, None, &self.admin)
            .unwrap()
            .plan_version
    }

    /// Scenario (b) configuration.
    fn configure(&self, v: PlanVersionNumber) {
        self.engine
            .wallet
            .update(
                &self.policy,
                v,
                WalletRules {
                    total_annual_amount: 50_000,
                    ..WalletRules::default()
                },
                &self.admin,
            )
            .unwrap();
        self.engine
            .benefits
            .update(
                &self.policy,
                v,
                BenefitComponents::all_disabled()
                    .with(BenefitKind::Consultation, BenefitComponentConfig::enabled()),
                &self.admin,
            )
            .unwrap();
        self.engine
            .coverage
            .update(
                &self.policy,
                v,
                &[
                    CoverageUpdateItem {
                        category_id: cat("CAT001"),
                        service_code: svc("CON001"),
                        enabled: true,
                        notes: Some("walk-in".into()),
                    },
                    CoverageUpdateItem {
                        category_id: cat("CAT005"),
                        service_code: svc("TEL001"),
                        enabled: true,
                        notes: None,
                    },
                ],
                &self.admin,
            )
            .unwrap();
    }

    fn publish_configured(&self, from: NaiveDate) -> PlanVersionNumber {
        let v = self.create_v(from);
        self.configure(v);
        self.engine
            .lifecycle
            .publish(&self.policy, v, &self.admin)
            .unwrap();
        v
    }

    fn assign(&self, user: &str, pinned: Option<PlanVersionNumber>) -> UserId {
        let user_id = UserId::new(user).unwrap();
        self.store.insert_assignment(Assignment {
            user_id: user_id.clone(),
            policy_id: self.policy.clone(),
            status: AssignmentStatus::Active,
            window: EffectiveWindow::starting(d(2026, 1, 1)),
            plan_version: pinned,
        });
        user_id
    }
}

#[test]
fn scenario_a_unconfigured_draft_is_blocked() {
    let w = world();
    let v1 = w.create_v(d(2026, 1, 1));
    assert_eq!(v1, PlanVersionNumber::FIRST);

    let report = w.engine.readiness.evaluate(&w.policy, v1).unwrap();
    assert_eq!(report.status, ReadinessStatus::Blocked);
    assert!(!report.check(CheckKey::WalletRules).unwrap().ok);
    assert!(!report.check(CheckKey::BenefitComponents).unwrap().ok);
    for failing in report.failures() {
        assert!(!failing.message.is_empty());
    }
}

#[test]
fn scenario_b_configured_draft_publishes() {
    let w = world();
    let v1 = w.create_v(d(2026, 1, 1));
    w.configure(v1);

    let report = w.engine.readiness.evaluate(&w.policy, v1).unwrap();
    assert!(
        report.checks.iter().all(|c| c.ok),
        "{:?}",
        report.failure_messages()
    );
    assert_eq!(report.status, ReadinessStatus::Ready);

    let published = w.engine.lifecycle.publish(&w.policy, v1, &w.admin).unwrap();
    assert_eq!(published.status, PlanVersionStatus::Published);
    assert!(published.published_at.is_some());
    assert_eq!(published.transitions.len(), 1);
}

#[test]
fn scenario_c_published_matrix_is_frozen() {
    let w = world();
    let v1 = w.publish_configured(d(2026, 1, 1));
    let before = w.store.find_coverage_rows(&w.policy, v1).unwrap();

    let err = w
        .engine
        .coverage
        .update(
            &w.policy,
            v1,
            &[CoverageUpdateItem {
                category_id: cat("CAT001"),
                service_code: svc("CON001"),
                enabled: false,
                notes: None,
            }],
            &w.admin,
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
    assert_eq!(w.store.find_coverage_rows(&w.policy, v1).unwrap(), before);
}

#[test]
fn scenario_d_enabled_only_with_nothing_enabled() {
    let w = world();
    let v1 = w.create_v(d(2026, 1, 1));
    w.engine
        .benefits
        .update(
            &w.policy,
            v1,
            BenefitComponents::all_disabled()
                .with(BenefitKind::Consultation, BenefitComponentConfig::enabled()),
            &w.admin,
        )
        .unwrap();

    let view = w
        .engine
        .coverage
        .project(
            &w.policy,
            v1,
            &CoverageFilters {
                enabled_only: true,
                ..CoverageFilters::default()
            },
        )
        .unwrap();
    assert!(view.categories.is_empty());
    assert_eq!(view.summary.enabled_services, 0);
}

#[test]
fn published_version_rejects_every_sub_config_write() {
    let w = world();
    let v1 = w.publish_configured(d(2026, 1, 1));
    let events_before = w.audit.len();

    let benefits = w.engine.benefits.update(
        &w.policy,
        v1,
        BenefitComponents::all_disabled(),
        &w.admin,
    );
    let wallet = w
        .engine
        .wallet
        .update(&w.policy, v1, WalletRules::default(), &w.admin);
    let bulk = w.engine.coverage.bulk_set_for_categories(
        &w.policy,
        v1,
        &[cat("CAT001")],
        false,
        &w.admin,
    );

    assert!(matches!(benefits, Err(EngineError::Conflict(_))));
    assert!(matches!(wallet, Err(EngineError::Conflict(_))));
    assert!(matches!(bulk, Err(EngineError::Conflict(_))));
    assert_eq!(w.audit.len(), events_before);

    let config = w.engine.resolver.resolve_for_admin(&w.policy, v1).unwrap();
    assert!(config.benefits.consultation.enabled);
    assert_eq!(config.wallet.total_annual_amount, 50_000);
}

#[test]
fn blocked_publish_leaves_version_draft() {
    let w = world();
    let v1 = w.create_v(d(2026, 1, 1));
    let err = w.engine.lifecycle.publish(&w.policy, v1, &w.admin).unwrap_err();
    match err {
        EngineError::ReadinessBlocked(report) => {
            assert_eq!(report.status, ReadinessStatus::Blocked);
            assert_eq!(report.checks.len(), CheckKey::ORDER.len());
        }
        other => panic!("expected readiness block, got {other:?}"),
    }
    let pv = w.engine.lifecycle.get_version(&w.policy, v1).unwrap();
    assert_eq!(pv.status, PlanVersionStatus::Draft);
}

#[test]
fn member_override_precedence() {
    let w = world();
    let _v1 = w.publish_configured(d(2026, 1, 1));
    let v2 = w.publish_configured(d(2026, 2, 1));
    let v3 = w.publish_configured(d(2026, 3, 1));
    w.engine
        .lifecycle
        .make_current_on(&w.policy, v3, &w.admin, d(2026, 6, 1))
        .unwrap();

    let pinned = w.assign("member-pinned", Some(v2));
    let config = w.engine.resolver.resolve_for_member(&pinned).unwrap();
    assert_eq!(config.plan_version, v2);
    assert_eq!(config.meta.version_source, Some(VersionSource::AssignmentOverride));
    assert_eq!(config.meta.status, ConfigStatus::Complete);

    let floating = w.assign("member-floating", None);
    let config = w.engine.resolver.resolve_for_member(&floating).unwrap();
    assert_eq!(config.plan_version, v3);
}

#[test]
fn member_views_without_assignment() {
    let w = world();
    w.create_v(d(2026, 1, 1));
    let nobody = UserId::new("nobody").unwrap();

    assert!(matches!(
        w.engine.resolver.resolve_for_member(&nobody),
        Err(EngineError::NotFound(_))
    ));
    assert!(!w.engine.benefits.get_for_member(&nobody).unwrap().any_enabled());
    assert!(w.engine.wallet.get_for_member(&nobody).unwrap().is_none());
    assert!(w.engine.coverage.member_coverage(&nobody).unwrap().is_none());
}

#[test]
fn member_coverage_shows_enabled_services_only() {
    let w = world();
    let v1 = w.publish_configured(d(2026, 1, 1));
    let member = w.assign("member-1", Some(v1));
    let view = w.engine.coverage.member_coverage(&member).unwrap().unwrap();
    assert_eq!(view.categories.len(), 2);
    assert!(view
        .categories
        .iter()
        .flat_map(|c| c.services.iter())
        .all(|s| s.enabled && !s.is_virtual));
    let clinic = &view.categories[0].services;
    assert_eq!(clinic.len(), 1);
    assert_eq!(clinic[0].notes.as_deref(), Some("walk-in"));
}

#[test]
fn deactivated_consultation_category_still_needs_coverage() {
    let w = world();
    let v1 = w.create_v(d(2026, 1, 1));
    w.engine
        .wallet
        .update(
            &w.policy,
            v1,
            WalletRules {
                total_annual_amount: 50_000,
                ..WalletRules::default()
            },
            &w.admin,
        )
        .unwrap();
    w.engine
        .benefits
        .update(
            &w.policy,
            v1,
            BenefitComponents::all_disabled()
                .with(BenefitKind::Consultation, BenefitComponentConfig::enabled()),
            &w.admin,
        )
        .unwrap();
    w.engine
        .coverage
        .update(
            &w.policy,
            v1,
            &[CoverageUpdateItem {
                category_id: cat("CAT001"),
                service_code: svc("CON001"),
                enabled: true,
                notes: None,
            }],
            &w.admin,
        )
        .unwrap();
    w.store.insert_category(Category {
        category_id: cat("CAT005"),
        code: "ONLINE_CONSULT".into(),
        name: "Online Consultation".into(),
        is_active: false,
        display_order: 5,
    });

    let err = w.engine.lifecycle.publish(&w.policy, v1, &w.admin).unwrap_err();
    match err {
        EngineError::ReadinessBlocked(report) => {
            let coverage = report.check(CheckKey::CoverageMatrix).unwrap();
            assert!(!coverage.ok);
            assert_eq!(coverage.message, "Coverage required for: CAT005");
        }
        other => panic!("expected readiness block, got {other:?}"),
    }
}

#[test]
fn lifecycle_mutations_are_audited_in_order() {
    let w = world();
    let v1 = w.publish_configured(d(2026, 1, 1));
    w.engine
        .lifecycle
        .make_current_on(&w.policy, v1, &w.admin, d(2026, 1, 15))
        .unwrap();

    let actions: Vec<AuditAction> = w.audit.events().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::PlanVersionCreate,
            AuditAction::WalletRulesUpsert,
            AuditAction::BenefitComponentsUpsert,
            AuditAction::CoverageUpsert,
            AuditAction::PlanVersionPublish,
            AuditAction::PlanVersionMakeCurrent,
        ]
    );
    assert!(w.audit.events().iter().all(|e| e.actor.id == "admin-7"));
}

struct BrokenSink;

impl AuditSink for BrokenSink {
    fn record(&self, _event: AuditEvent) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("audit store offline".into()))
    }
}

#[test]
fn audit_failure_never_fails_the_operation() {
    let w = world();
    let engine = PlanEngine::new(Repositories::from_store(
        w.store.clone(),
        Arc::new(BrokenSink),
    ));
    let created = engine
        .lifecycle
        .create_draft(&w.policy, d(2026, 1, 1), None, &w.admin)
        .unwrap();
    assert_eq!(created.status, PlanVersionStatus::Draft);
}

#[test]
fn make_current_rejects_draft_versions() {
    let w = world();
    let v1 = w.create_v(d(2026, 1, 1));
    let err = w
        .engine
        .lifecycle
        .make_current_on(&w.policy, v1, &w.admin, d(2026, 6, 1))
        .unwrap_err();
    assert!(matches!(err, EngineError::BadRequest(_)));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    const CLINIC_SERVICES: [&str; 3] = ["CON001", "CON002", "CON003"];

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn summary_counts_track_persisted_toggles(flags in proptest::array::uniform3(any::<bool>())) {
            let store = MemoryStore::with_reference_master_data().unwrap();
            let policy = PolicyId::new("P-PROP").unwrap();
            store.insert_policy(Policy {
                id: policy.clone(),
                policy_number: "P-PROP".into(),
                name: "Property Policy".into(),
                window: EffectiveWindow::starting(d(2026, 1, 1)),
                current_plan_version: None,
            });
            let engine = PlanEngine::new(Repositories::from_store(
                store,
                Arc::new(MemoryAuditLog::new()),
            ));
            let admin = ActorContext::new("admin-1", "admin@corp.test", ActorRole::Admin);
            let v = engine
                .lifecycle
                .create_draft(&policy, d(2026, 1, 1), None, &admin)
                .unwrap()
                .plan_version;
            engine
                .benefits
                .update(
                    &policy,
                    v,
                    BenefitComponents::all_disabled()
                        .with(BenefitKind::Consultation, BenefitComponentConfig::enabled()),
                    &admin,
                )
                .unwrap();

            let items: Vec<CoverageUpdateItem> = CLINIC_SERVICES
                .iter()
                .zip(flags)
                .map(|(code, enabled)| CoverageUpdateItem {
                    category_id: cat("CAT001"),
                    service_code: svc(code),
                    enabled,
                    notes: None,
                })
                .collect();
            let view = engine.coverage.update(&policy, v, &items, &admin).unwrap();

            let on = flags.iter().filter(|f| **f).count();
            prop_assert_eq!(view.summary.enabled_services, on);
            prop_assert_eq!(
                view.summary.enabled_services + view.summary.disabled_services,
                view.summary.total_services
            );

            let filtered = engine
                .coverage
                .project(
                    &policy,
                    v,
                    &CoverageFilters {
                        enabled_only: true,
                        ..CoverageFilters::default()
                    },
                )
                .unwrap();
            let shown: usize = filtered.categories.iter().map(|c| c.services.len()).sum();
            prop_assert_eq!(shown, on);
        }
    }
}
