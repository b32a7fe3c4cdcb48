//! # Coverage Matrix Projector
//!
//! Coverage is only meaningful for categories some enabled benefit brings
//! into scope. The projector derives that scope from the version's benefit
//! components via the benefit→category table, crosses it with active
//! master-data services, and overlays the sparse persisted rows.
//!
//! A (category, service) pair with no persisted row is emitted as a
//! *virtual* row: `enabled = false`, `isVirtual = true`. Writing it through
//! [`CoverageMatrixProjector::update`] makes it real.
//!
//! Reads are side-effect-free. Writes validate the whole batch first, then
//! apply it through one atomic repository call that re-checks DRAFT status
//! under the store lock.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use obw_core::{
    ActorContext, BenefitKind, CategoryId, PlanVersionNumber, PolicyId, ServiceCode, Timestamp,
    UserId,
};
use obw_state::PlanVersion;
use obw_store::{AuditAction, AuditEvent, BenefitComponents, CoverageWrite};

use crate::context::Repositories;
use crate::error::EngineError;
use crate::readiness::{CheckKey, ReadinessCheck};

/// Categories implied by every enabled benefit kind, de-duplicated.
///
/// Pure: the result depends only on `components`, and enabling another
/// kind can only grow it.
pub fn enabled_category_ids(components: &BenefitComponents) -> BTreeSet<CategoryId> {
    BenefitKind::all()
        .iter()
        .filter(|kind| components.get(**kind).enabled)
        .flat_map(|kind| kind.category_ids().iter())
        .filter_map(|id| CategoryId::new(*id).ok())
        .collect()
}

// ─── Views ───────────────────────────────────────────────────────────

/// Projection filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageFilters {
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub search_text: Option<String>,
    #[serde(default)]
    pub enabled_only: bool,
}

/// One (category, service) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageServiceView {
    pub service_code: ServiceCode,
    pub service_name: String,
    pub category_id: CategoryId,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// No persisted row backs this cell.
    pub is_virtual: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

/// A category and its visible services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageCategoryView {
    pub category_id: CategoryId,
    pub code: String,
    pub name: String,
    /// Active services under the category before `enabledOnly` pruning.
    pub services_count: usize,
    pub enabled_count: usize,
    pub services: Vec<CoverageServiceView>,
}

/// Counts over the unpruned universe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub total_services: usize,
    pub enabled_services: usize,
    pub disabled_services: usize,
}

/// The projected matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMatrixView {
    pub policy_id: PolicyId,
    pub plan_version: PlanVersionNumber,
    pub categories: Vec<CoverageCategoryView>,
    pub summary: CoverageSummary,
}

/// A category option for the coverage editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub category_id: CategoryId,
    pub code: String,
    pub name: String,
    pub services_count: usize,
}

/// One item of a coverage update batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageUpdateItem {
    pub category_id: CategoryId,
    pub service_code: ServiceCode,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Outcome of a bulk category toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCoverageResult {
    pub message: String,
    pub updated_count: usize,
    pub category_ids: Vec<CategoryId>,
    pub enabled: bool,
}

// ─── Projector ───────────────────────────────────────────────────────

/// Derives, projects and writes the coverage matrix of a plan version.
#[derive(Debug, Clone)]
pub struct CoverageMatrixProjector {
    repos: Repositories,
}

impl CoverageMatrixProjector {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// In-scope categories for a stored version. A version with no
    /// benefit components has none.
    pub fn enabled_category_ids_for(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<BTreeSet<CategoryId>, EngineError> {
        let components = self
            .repos
            .benefit_components
            .find_benefit_components(policy_id, version)?
            .map(|set| set.components)
            .unwrap_or_default();
        Ok(enabled_category_ids(&components))
    }

    /// Project the matrix for a plan version.
    pub fn project(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        filters: &CoverageFilters,
    ) -> Result<CoverageMatrixView, EngineError> {
        self.repos.require_plan_version(policy_id, version)?;
        self.project_unchecked(policy_id, version, filters)
    }

    fn project_unchecked(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        filters: &CoverageFilters,
    ) -> Result<CoverageMatrixView, EngineError> {
        let mut scope: Vec<CategoryId> = self
            .enabled_category_ids_for(policy_id, version)?
            .into_iter()
            .collect();
        if let Some(only) = &filters.category_id {
            scope.retain(|id| id == only);
        }

        let categories = if scope.is_empty() {
            Vec::new()
        } else {
            self.repos.master_data.find_active_categories(Some(&scope))?
        };
        let category_ids: Vec<CategoryId> =
            categories.iter().map(|c| c.category_id.clone()).collect();
        let services = if category_ids.is_empty() {
            Vec::new()
        } else {
            self.repos
                .master_data
                .find_active_services(&category_ids, filters.search_text.as_deref())?
        };

        let persisted: HashMap<(CategoryId, ServiceCode), _> = self
            .repos
            .coverage
            .find_coverage_rows(policy_id, version)?
            .into_iter()
            .map(|row| ((row.category_id.clone(), row.service_code.clone()), row))
            .collect();

        let mut summary = CoverageSummary::default();
        let mut views = Vec::with_capacity(categories.len());

        for category in categories {
            let mut services_count = 0;
            let mut enabled_count = 0;
            let mut cells = Vec::new();

            for service in services
                .iter()
                .filter(|s| s.category_id == category.category_id)
            {
                services_count += 1;
                let row = persisted.get(&(category.category_id.clone(), service.service_code.clone()));
                let enabled = row.map_or(false, |r| r.enabled);
                if enabled {
                    enabled_count += 1;
                }
                if filters.enabled_only && !enabled {
                    continue;
                }
                cells.push(CoverageServiceView {
                    service_code: service.service_code.clone(),
                    service_name: service.service_name.clone(),
                    category_id: category.category_id.clone(),
                    enabled,
                    notes: row.and_then(|r| r.notes.clone()),
                    is_virtual: row.is_none(),
                    updated_at: row.map(|r| r.updated_at),
                });
            }

            summary.total_services += services_count;
            summary.enabled_services += enabled_count;

            if !cells.is_empty() {
                views.push(CoverageCategoryView {
                    category_id: category.category_id,
                    code: category.code,
                    name: category.name,
                    services_count,
                    enabled_count,
                    services: cells,
                });
            }
        }
        summary.disabled_services = summary.total_services - summary.enabled_services;

        tracing::debug!(
            policy_id = %policy_id,
            plan_version = %version,
            categories = views.len(),
            total = summary.total_services,
            enabled = summary.enabled_services,
            "projected coverage matrix"
        );

        Ok(CoverageMatrixView {
            policy_id: policy_id.clone(),
            plan_version: version,
            categories: views,
            summary,
        })
    }

    /// Write a batch of coverage rows, then return the refreshed matrix.
    ///
    /// Every item is validated before anything is written; one bad item
    /// fails the whole batch.
    pub fn update(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        items: &[CoverageUpdateItem],
        actor: &ActorContext,
    ) -> Result<CoverageMatrixView, EngineError> {
        let plan_version = self.repos.require_plan_version(policy_id, version)?;
        require_draft_for_coverage(&plan_version)?;
        self.validate_items(items)?;

        let writes: Vec<CoverageWrite> = items
            .iter()
            .map(|item| CoverageWrite {
                category_id: item.category_id.clone(),
                service_code: item.service_code.clone(),
                enabled: item.enabled,
                notes: item.notes.clone(),
            })
            .collect();
        let written = self
            .repos
            .coverage
            .upsert_coverage_rows(policy_id, version, &writes, &actor.id)?;

        tracing::info!(
            policy_id = %policy_id,
            plan_version = %version,
            actor = %actor.id,
            rows = written,
            "coverage matrix updated"
        );
        self.repos.audit(
            AuditEvent::new(
                actor,
                AuditAction::CoverageUpsert,
                "coverageMatrix",
                format!("{policy_id}/v{version}"),
                format!("Updated {written} coverage row(s) for plan version {version}"),
            )
            .with_after(&writes),
        );

        self.project_unchecked(policy_id, version, &CoverageFilters::default())
    }

    /// Set `enabled` on every active service under `category_ids`, leaving
    /// notes untouched.
    pub fn bulk_set_for_categories(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        category_ids: &[CategoryId],
        enabled: bool,
        actor: &ActorContext,
    ) -> Result<BulkCoverageResult, EngineError> {
        let plan_version = self.repos.require_plan_version(policy_id, version)?;
        require_draft_for_coverage(&plan_version)?;

        let services = if category_ids.is_empty() {
            Vec::new()
        } else {
            self.repos.master_data.find_active_services(category_ids, None)?
        };
        let writes: Vec<CoverageWrite> = services
            .into_iter()
            .map(|s| CoverageWrite {
                category_id: s.category_id,
                service_code: s.service_code,
                enabled,
                notes: None,
            })
            .collect();
        let updated_count = self
            .repos
            .coverage
            .upsert_coverage_rows(policy_id, version, &writes, &actor.id)?;

        tracing::info!(
            policy_id = %policy_id,
            plan_version = %version,
            actor = %actor.id,
            rows = updated_count,
            enabled,
            "coverage bulk update applied"
        );
        self.repos.audit(
            AuditEvent::new(
                actor,
                AuditAction::CoverageBulkUpsert,
                "coverageMatrix",
                format!("{policy_id}/v{version}"),
                format!(
                    "{} {updated_count} service(s) in {} categories",
                    if enabled { "Enabled" } else { "Disabled" },
                    category_ids.len()
                ),
            )
            .with_after(&writes),
        );

        Ok(BulkCoverageResult {
            message: format!(
                "Services {} successfully",
                if enabled { "enabled" } else { "disabled" }
            ),
            updated_count,
            category_ids: category_ids.to_vec(),
            enabled,
        })
    }

    /// Active in-scope categories with their active-service counts.
    pub fn categories_for_plan_version(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<Vec<CategoryInfo>, EngineError> {
        self.repos.require_plan_version(policy_id, version)?;
        let scope: Vec<CategoryId> = self
            .enabled_category_ids_for(policy_id, version)?
            .into_iter()
            .collect();
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        let categories = self.repos.master_data.find_active_categories(Some(&scope))?;
        let ids: Vec<CategoryId> = categories.iter().map(|c| c.category_id.clone()).collect();
        let services = self.repos.master_data.find_active_services(&ids, None)?;
        Ok(categories
            .into_iter()
            .map(|c| CategoryInfo {
                services_count: services
                    .iter()
                    .filter(|s| s.category_id == c.category_id)
                    .count(),
                category_id: c.category_id,
                code: c.code,
                name: c.name,
            })
            .collect())
    }

    /// A member's enabled coverage under their effective version. `None`
    /// without an ACTIVE assignment.
    pub fn member_coverage(
        &self,
        user_id: &UserId,
    ) -> Result<Option<CoverageMatrixView>, EngineError> {
        let Some(member) = self.repos.resolve_member_version(user_id)? else {
            return Ok(None);
        };
        let filters = CoverageFilters {
            enabled_only: true,
            ..CoverageFilters::default()
        };
        self.project(&member.policy.id, member.version, &filters)
            .map(Some)
    }

    /// Readiness sub-check: every in-scope category has at least one
    /// enabled persisted row, whether or not the catalogue still lists it
    /// as active. Vacuously ok when no benefit is enabled.
    pub fn readiness_check(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<ReadinessCheck, EngineError> {
        let scope: Vec<CategoryId> = self
            .enabled_category_ids_for(policy_id, version)?
            .into_iter()
            .collect();
        if scope.is_empty() {
            return Ok(ReadinessCheck::pass(
                CheckKey::CoverageMatrix,
                "No benefits enabled requiring coverage",
            ));
        }

        let rows = self.repos.coverage.find_coverage_rows(policy_id, version)?;
        let missing: Vec<CategoryId> = scope
            .into_iter()
            .filter(|id| !rows.iter().any(|r| r.enabled && &r.category_id == id))
            .collect();

        if missing.is_empty() {
            return Ok(ReadinessCheck::pass(
                CheckKey::CoverageMatrix,
                "Coverage properly configured",
            ));
        }

        let listed: Vec<&str> = missing.iter().map(|id| id.as_str()).collect();
        Ok(ReadinessCheck::fail(
            CheckKey::CoverageMatrix,
            format!("Coverage required for: {}", listed.join(", ")),
        )
        .with_details(serde_json::json!({
            "missing": missing
                .iter()
                .map(|id| serde_json::json!({ "categoryId": id }))
                .collect::<Vec<_>>(),
        })))
    }

    fn validate_items(&self, items: &[CoverageUpdateItem]) -> Result<(), EngineError> {
        if items.is_empty() {
            return Ok(());
        }
        let mut wanted: Vec<CategoryId> = items.iter().map(|i| i.category_id.clone()).collect();
        wanted.sort();
        wanted.dedup();

        let active: BTreeSet<CategoryId> = self
            .repos
            .master_data
            .find_active_categories(Some(&wanted))?
            .into_iter()
            .map(|c| c.category_id)
            .collect();
        let services: BTreeSet<(CategoryId, ServiceCode)> = self
            .repos
            .master_data
            .find_active_services(&wanted, None)?
            .into_iter()
            .map(|s| (s.category_id, s.service_code))
            .collect();

        for item in items {
            if !active.contains(&item.category_id) {
                return Err(EngineError::NotFound(format!(
                    "Category {} not found",
                    item.category_id
                )));
            }
            if !services.contains(&(item.category_id.clone(), item.service_code.clone())) {
                return Err(EngineError::NotFound(format!(
                    "Service {} not found in category {}",
                    item.service_code, item.category_id
                )));
            }
        }
        Ok(())
    }
}

fn require_draft_for_coverage(plan_version: &PlanVersion) -> Result<(), EngineError> {
    if plan_version.is_draft() {
        Ok(())
    } else {
        Err(EngineError::Conflict(
            "Can only update coverage for DRAFT plan versions".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use obw_store::{BenefitComponentConfig, Category};

    fn cat(id: &str) -> CategoryId {
        CategoryId::new(id).unwrap()
    }

    fn item(c: &str, s: &str, enabled: bool) -> CoverageUpdateItem {
        CoverageUpdateItem {
            category_id: cat(c),
            service_code: ServiceCode::new(s).unwrap(),
            enabled,
            notes: None,
        }
    }

    #[test]
    fn test_enabled_category_ids_union_is_deduplicated() {
        let components = BenefitComponents::all_disabled()
            .with(BenefitKind::Ahc, BenefitComponentConfig::enabled())
            .with(BenefitKind::Wellness, BenefitComponentConfig::enabled())
            .with(BenefitKind::Diagnostics, BenefitComponentConfig::enabled());
        let ids: Vec<String> = enabled_category_ids(&components)
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(ids, vec!["CAT003", "CAT004", "CAT008"]);
    }

    #[test]
    fn test_no_benefits_no_scope() {
        assert!(enabled_category_ids(&BenefitComponents::all_disabled()).is_empty());
    }

    #[test]
    fn test_project_emits_virtual_rows() {
        let fx = Fixture::new();
        fx.enable(&[BenefitKind::Pharmacy]);
        let view = fx
            .engine
            .coverage
            .project(&fx.policy_id, fx.v1, &CoverageFilters::default())
            .unwrap();
        assert_eq!(view.categories.len(), 1);
        let pharmacy = &view.categories[0];
        assert_eq!(pharmacy.code, "PHARMACY");
        assert_eq!(pharmacy.services_count, 2);
        assert!(pharmacy.services.iter().all(|s| s.is_virtual && !s.enabled));
        assert_eq!(view.summary.total_services, 2);
        assert_eq!(view.summary.disabled_services, 2);
    }

    #[test]
    fn test_update_makes_row_real() {
        let fx = Fixture::new();
        fx.enable(&[BenefitKind::Pharmacy]);
        let view = fx
            .engine
            .coverage
            .update(&fx.policy_id, fx.v1, &[item("CAT002", "PHA001", true)], &fx.actor)
            .unwrap();
        let cells = &view.categories[0].services;
        let pha1 = cells.iter().find(|s| s.service_code.as_str() == "PHA001").unwrap();
        assert!(!pha1.is_virtual);
        assert!(pha1.enabled);
        let pha2 = cells.iter().find(|s| s.service_code.as_str() == "PHA002").unwrap();
        assert!(pha2.is_virtual);
        assert_eq!(view.summary.enabled_services, 1);
        assert_eq!(view.categories[0].enabled_count, 1);
    }

    #[test]
    fn test_explicitly_disabled_row_is_not_virtual() {
        let fx = Fixture::new();
        fx.enable(&[BenefitKind::Pharmacy]);
        let view = fx
            .engine
            .coverage
            .update(&fx.policy_id, fx.v1, &[item("CAT002", "PHA001", false)], &fx.actor)
            .unwrap();
        let pha1 = view.categories[0]
            .services
            .iter()
            .find(|s| s.service_code.as_str() == "PHA001")
            .unwrap();
        assert!(!pha1.is_virtual);
        assert!(!pha1.enabled);
    }

    #[test]
    fn test_enabled_only_prunes_but_summary_keeps_universe() {
        let fx = Fixture::new();
        fx.enable(&[BenefitKind::Pharmacy, BenefitKind::Dental]);
        fx.engine
            .coverage
            .update(&fx.policy_id, fx.v1, &[item("CAT002", "PHA002", true)], &fx.actor)
            .unwrap();
        let view = fx
            .engine
            .coverage
            .project(
                &fx.policy_id,
                fx.v1,
                &CoverageFilters {
                    enabled_only: true,
                    ..CoverageFilters::default()
                },
            )
            .unwrap();
        assert_eq!(view.categories.len(), 1);
        assert_eq!(view.categories[0].services.len(), 1);
        assert_eq!(view.categories[0].services_count, 2);
        assert_eq!(view.summary.total_services, 4);
        assert_eq!(view.summary.enabled_services, 1);
        assert_eq!(view.summary.disabled_services, 3);
    }

    #[test]
    fn test_category_and_search_filters() {
        let fx = Fixture::new();
        fx.enable(&[BenefitKind::Diagnostics]);
        let view = fx
            .engine
            .coverage
            .project(
                &fx.policy_id,
                fx.v1,
                &CoverageFilters {
                    category_id: Some(cat("CAT004")),
                    search_text: Some("THYROID".into()),
                    enabled_only: false,
                },
            )
            .unwrap();
        assert_eq!(view.categories.len(), 1);
        assert_eq!(view.categories[0].category_id, cat("CAT004"));
        assert_eq!(view.categories[0].services.len(), 1);
        assert_eq!(view.categories[0].services[0].service_name, "Thyroid Panel");
    }

    #[test]
    fn test_category_filter_outside_scope_yields_nothing() {
        let fx = Fixture::new();
        fx.enable(&[BenefitKind::Pharmacy]);
        let view = fx
            .engine
            .coverage
            .project(
                &fx.policy_id,
                fx.v1,
                &CoverageFilters {
                    category_id: Some(cat("CAT006")),
                    ..CoverageFilters::default()
                },
            )
            .unwrap();
        assert!(view.categories.is_empty());
        assert_eq!(view.summary.total_services, 0);
    }

    #[test]
    fn test_update_rejects_unknown_category_before_writing() {
        let fx = Fixture::new();
        fx.enable(&[BenefitKind::Pharmacy]);
        let err = fx
            .engine
            .coverage
            .update(
                &fx.policy_id,
                fx.v1,
                &[item("CAT002", "PHA001", true), item("CAT099", "X1", true)],
                &fx.actor,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(ref m) if m == "Category CAT099 not found"));
        assert!(fx.rows().is_empty());
    }

    #[test]
    fn test_update_rejects_service_from_other_category() {
        let fx = Fixture::new();
        let err = fx
            .engine
            .coverage
            .update(&fx.policy_id, fx.v1, &[item("CAT001", "PHA001", true)], &fx.actor)
            .unwrap_err();
        assert!(
            matches!(err, EngineError::NotFound(ref m) if m == "Service PHA001 not found in category CAT001")
        );
    }

    #[test]
    fn test_update_on_published_version_conflicts() {
        let fx = Fixture::new();
        fx.publish_v1_directly();
        let err = fx
            .engine
            .coverage
            .update(&fx.policy_id, fx.v1, &[item("CAT002", "PHA001", true)], &fx.actor)
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
        assert!(fx.rows().is_empty());
    }

    #[test]
    fn test_bulk_set_touches_every_active_service_and_keeps_notes() {
        let fx = Fixture::new();
        fx.enable(&[BenefitKind::Diagnostics]);
        let mut noted = item("CAT003", "DIA001", false);
        noted.notes = Some("pre-auth above 5k".into());
        fx.engine
            .coverage
            .update(&fx.policy_id, fx.v1, &[noted], &fx.actor)
            .unwrap();

        let result = fx
            .engine
            .coverage
            .bulk_set_for_categories(
                &fx.policy_id,
                fx.v1,
                &[cat("CAT003"), cat("CAT004")],
                true,
                &fx.actor,
            )
            .unwrap();
        assert_eq!(result.updated_count, 5);
        assert!(result.enabled);
        assert_eq!(result.message, "Services enabled successfully");

        let rows = fx.rows();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.enabled));
        let dia = rows.iter().find(|r| r.service_code.as_str() == "DIA001").unwrap();
        assert_eq!(dia.notes.as_deref(), Some("pre-auth above 5k"));
    }

    #[test]
    fn test_categories_for_plan_version_counts_services() {
        let fx = Fixture::new();
        fx.enable(&[BenefitKind::Consultation]);
        let infos = fx
            .engine
            .coverage
            .categories_for_plan_version(&fx.policy_id, fx.v1)
            .unwrap();
        let summary: Vec<(String, usize)> = infos
            .iter()
            .map(|c| (c.category_id.to_string(), c.services_count))
            .collect();
        assert_eq!(
            summary,
            vec![("CAT001".to_string(), 3), ("CAT005".to_string(), 1)]
        );
    }

    #[test]
    fn test_readiness_vacuous_when_nothing_enabled() {
        let fx = Fixture::new();
        let check = fx.engine.coverage.readiness_check(&fx.policy_id, fx.v1).unwrap();
        assert!(check.ok);
        assert_eq!(check.message, "No benefits enabled requiring coverage");
    }

    #[test]
    fn test_readiness_lists_uncovered_categories() {
        let fx = Fixture::new();
        fx.enable(&[BenefitKind::Consultation]);
        fx.engine
            .coverage
            .update(&fx.policy_id, fx.v1, &[item("CAT001", "CON002", true)], &fx.actor)
            .unwrap();
        let check = fx.engine.coverage.readiness_check(&fx.policy_id, fx.v1).unwrap();
        assert!(!check.ok);
        assert_eq!(check.message, "Coverage required for: CAT005");
        let details = check.details.unwrap();
        assert_eq!(details["missing"][0]["categoryId"], "CAT005");
    }

    #[test]
    fn test_readiness_counts_deactivated_in_scope_category() {
        let fx = Fixture::new();
        fx.store.insert_category(Category {
            category_id: cat("CAT006"),
            code: "DENTAL".into(),
            name: "Dental Services".into(),
            is_active: false,
            display_order: 6,
        });
        fx.enable(&[BenefitKind::Dental]);
        let check = fx.engine.coverage.readiness_check(&fx.policy_id, fx.v1).unwrap();
        assert!(!check.ok);
        assert_eq!(check.message, "Coverage required for: CAT006");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn components_from(mask: u8) -> BenefitComponents {
            BenefitKind::all()
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .fold(BenefitComponents::all_disabled(), |acc, (_, kind)| {
                    acc.with(*kind, BenefitComponentConfig::enabled())
                })
        }

        proptest! {
            #[test]
            fn enabled_category_ids_is_pure(mask in any::<u8>()) {
                let components = components_from(mask);
                prop_assert_eq!(
                    enabled_category_ids(&components),
                    enabled_category_ids(&components)
                );
            }

            #[test]
            fn enabling_a_kind_only_grows_scope(mask in any::<u8>(), extra in 0usize..8) {
                let before = enabled_category_ids(&components_from(mask));
                let after = enabled_category_ids(&components_from(mask | (1 << extra)));
                prop_assert!(before.is_subset(&after));
            }

            #[test]
            fn scope_is_union_of_table_rows(mask in any::<u8>()) {
                let components = components_from(mask);
                let expected: BTreeSet<String> = components
                    .enabled_kinds()
                    .iter()
                    .flat_map(|k| k.category_ids().iter().map(|s| s.to_string()))
                    .collect();
                let actual: BTreeSet<String> = enabled_category_ids(&components)
                    .into_iter()
                    .map(|c| c.to_string())
                    .collect();
                prop_assert_eq!(actual, expected);
            }
        }
    }
}
