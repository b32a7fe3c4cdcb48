//! # In-Memory Store
//!
//! Reference implementation of every repository contract, backed by
//! `parking_lot` read-write locks. Used by the API server and by tests.
//!
//! All operations are synchronous and no lock is held across an `.await`.
//! Sub-configuration writes take the plan-version table's read lock before
//! the target table's write lock, and status transitions take only the
//! plan-version write lock, so a publish and an edit of the same version are
//! strictly ordered and the lock order is fixed.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

use obw_core::{CategoryId, PlanVersionNumber, PolicyId, ServiceCode, Timestamp, UserId};
use obw_state::{PlanVersion, PlanVersionError, PlanVersionStatus};

use crate::error::StoreError;
use crate::records::{
    Assignment, AssignmentStatus, BenefitComponentSet, BenefitComponents, Category, CoverageRow,
    CoverageWrite, Policy, Service, WalletRuleSet, WalletRules,
};
use crate::reference::{reference_categories, reference_services};
use crate::repository::{
    AssignmentRepository, BenefitComponentRepository, CoverageMatrixRepository,
    MasterDataRepository, PlanVersionRepository, PolicyRepository, Upserted, WalletRuleRepository,
};

// -- Generic Table ------------------------------------------------------------

/// Thread-safe, cloneable in-memory key-value table.
#[derive(Debug)]
pub struct Table<K, V> {
    data: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for Table<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash, V: Clone> Table<K, V> {
    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.data.write().insert(key, value)
    }

    /// Retrieve a record by key.
    pub fn get(&self, key: &K) -> Option<V> {
        self.data.read().get(key).cloned()
    }

    /// All values matching `pred`.
    pub fn filter(&self, pred: impl Fn(&K, &V) -> bool) -> Vec<V> {
        self.data
            .read()
            .iter()
            .filter(|(k, v)| pred(k, v))
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Atomically read-validate-update a record.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        key: &K,
        f: impl FnOnce(&mut V) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(key).map(f)
    }

    /// Run `f` against the whole map under the read lock.
    pub fn with_read<R>(&self, f: impl FnOnce(&HashMap<K, V>) -> R) -> R {
        f(&self.data.read())
    }

    /// Run `f` against the whole map under the write lock.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut HashMap<K, V>) -> R) -> R {
        f(&mut self.data.write())
    }
}

// -- Memory Store -------------------------------------------------------------

type VersionKey = (PolicyId, PlanVersionNumber);
type CoverageKey = (CategoryId, ServiceCode);

fn render_key(policy_id: &PolicyId, version: PlanVersionNumber) -> String {
    format!("{policy_id}/v{version}")
}

/// In-memory implementation of every repository contract.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    policies: Table<PolicyId, Policy>,
    plan_versions: Table<VersionKey, PlanVersion>,
    benefit_components: Table<VersionKey, BenefitComponentSet>,
    wallet_rules: Table<VersionKey, WalletRuleSet>,
    coverage: Table<VersionKey, BTreeMap<CoverageKey, CoverageRow>>,
    assignments: Table<UserId, Vec<Assignment>>,
    categories: Table<CategoryId, Category>,
    services: Table<ServiceCode, Service>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with the reference category/service catalogue.
    pub fn with_reference_master_data() -> Result<Self, obw_core::ValidationError> {
        let store = Self::new();
        for category in reference_categories()? {
            store.insert_category(category);
        }
        for service in reference_services()? {
            store.insert_service(service);
        }
        Ok(store)
    }

    // Administrative writes owned by other subsystems.

    pub fn insert_policy(&self, policy: Policy) {
        self.policies.insert(policy.id.clone(), policy);
    }

    pub fn insert_assignment(&self, assignment: Assignment) {
        self.assignments.with_write(|map| {
            map.entry(assignment.user_id.clone())
                .or_default()
                .push(assignment)
        });
    }

    pub fn insert_category(&self, category: Category) {
        self.categories
            .insert(category.category_id.clone(), category);
    }

    pub fn insert_service(&self, service: Service) {
        self.services.insert(service.service_code.clone(), service);
    }

    /// Run `write` only if the version exists and is DRAFT, holding the
    /// plan-version read lock for the duration.
    fn guarded_write<R>(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        write: impl FnOnce() -> R,
    ) -> Result<R, StoreError> {
        let key = (policy_id.clone(), version);
        self.plan_versions.with_read(|versions| {
            let pv = versions.get(&key).ok_or_else(|| StoreError::Missing {
                key: render_key(policy_id, version),
            })?;
            if !pv.status.is_editable() {
                return Err(StoreError::NotEditable {
                    key: render_key(policy_id, version),
                    status: pv.status.to_string(),
                });
            }
            Ok(write())
        })
    }
}

impl PolicyRepository for MemoryStore {
    fn find_policy(&self, id: &PolicyId) -> Result<Option<Policy>, StoreError> {
        Ok(self.policies.get(id))
    }

    fn update_current_version(
        &self,
        id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<Option<PlanVersionNumber>, StoreError> {
        self.policies
            .try_update(id, |policy| {
                Ok::<_, StoreError>(policy.current_plan_version.replace(version))
            })
            .unwrap_or_else(|| {
                Err(StoreError::Missing {
                    key: id.to_string(),
                })
            })
    }
}

impl PlanVersionRepository for MemoryStore {
    fn find_plan_version(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<Option<PlanVersion>, StoreError> {
        Ok(self.plan_versions.get(&(policy_id.clone(), version)))
    }

    fn find_max_version(&self, policy_id: &PolicyId) -> Result<u32, StoreError> {
        Ok(self.plan_versions.with_read(|versions| {
            versions
                .keys()
                .filter(|(p, _)| p == policy_id)
                .map(|(_, v)| v.get())
                .max()
                .unwrap_or(0)
        }))
    }

    fn insert_plan_version(&self, version: PlanVersion) -> Result<(), StoreError> {
        let key = (version.policy_id.clone(), version.plan_version);
        self.plan_versions.with_write(|versions| {
            if versions.contains_key(&key) {
                return Err(StoreError::Duplicate {
                    key: render_key(&key.0, key.1),
                });
            }
            versions.insert(key, version);
            Ok(())
        })
    }

    fn update_plan_version(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        apply: &mut dyn FnMut(&mut PlanVersion) -> Result<(), PlanVersionError>,
    ) -> Result<PlanVersion, StoreError> {
        self.plan_versions
            .try_update(&(policy_id.clone(), version), |pv| {
                let mut draft = pv.clone();
                apply(&mut draft)?;
                *pv = draft;
                Ok::<_, StoreError>(pv.clone())
            })
            .unwrap_or_else(|| {
                Err(StoreError::Missing {
                    key: render_key(policy_id, version),
                })
            })
    }

    fn list_plan_versions(
        &self,
        policy_id: &PolicyId,
        status: Option<PlanVersionStatus>,
    ) -> Result<Vec<PlanVersion>, StoreError> {
        let mut versions = self.plan_versions.filter(|(p, _), v| {
            p == policy_id && status.map_or(true, |s| v.status == s)
        });
        versions.sort_by(|a, b| b.plan_version.cmp(&a.plan_version));
        Ok(versions)
    }
}

impl BenefitComponentRepository for MemoryStore {
    fn find_benefit_components(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<Option<BenefitComponentSet>, StoreError> {
        Ok(self.benefit_components.get(&(policy_id.clone(), version)))
    }

    fn upsert_benefit_components(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        components: BenefitComponents,
        actor_id: &str,
    ) -> Result<Upserted<BenefitComponentSet>, StoreError> {
        let key = (policy_id.clone(), version);
        self.guarded_write(policy_id, version, || {
            self.benefit_components.with_write(|table| {
                let now = Timestamp::now();
                let before = table.get(&key).cloned();
                let after = BenefitComponentSet {
                    policy_id: policy_id.clone(),
                    plan_version: version,
                    components,
                    created_by: before
                        .as_ref()
                        .and_then(|b| b.created_by.clone())
                        .or_else(|| Some(actor_id.to_string())),
                    updated_by: Some(actor_id.to_string()),
                    created_at: before.as_ref().and_then(|b| b.created_at).or(Some(now)),
                    updated_at: Some(now),
                };
                table.insert(key.clone(), after.clone());
                Upserted { before, after }
            })
        })
    }
}

impl WalletRuleRepository for MemoryStore {
    fn find_wallet_rules(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<Option<WalletRuleSet>, StoreError> {
        Ok(self.wallet_rules.get(&(policy_id.clone(), version)))
    }

    fn upsert_wallet_rules(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        rules: WalletRules,
        actor_id: &str,
    ) -> Result<Upserted<WalletRuleSet>, StoreError> {
        let key = (policy_id.clone(), version);
        self.guarded_write(policy_id, version, || {
            self.wallet_rules.with_write(|table| {
                let now = Timestamp::now();
                let before = table.get(&key).cloned();
                let after = WalletRuleSet {
                    policy_id: policy_id.clone(),
                    plan_version: version,
                    rules,
                    created_by: before
                        .as_ref()
                        .map_or_else(|| actor_id.to_string(), |b| b.created_by.clone()),
                    updated_by: actor_id.to_string(),
                    created_at: before.as_ref().map_or(now, |b| b.created_at),
                    updated_at: now,
                };
                table.insert(key.clone(), after.clone());
                Upserted { before, after }
            })
        })
    }
}

impl CoverageMatrixRepository for MemoryStore {
    fn find_coverage_rows(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<Vec<CoverageRow>, StoreError> {
        Ok(self
            .coverage
            .get(&(policy_id.clone(), version))
            .map(|rows| rows.into_values().collect())
            .unwrap_or_default())
    }

    fn upsert_coverage_rows(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        writes: &[CoverageWrite],
        actor_id: &str,
    ) -> Result<usize, StoreError> {
        let key = (policy_id.clone(), version);
        self.guarded_write(policy_id, version, || {
            self.coverage.with_write(|table| {
                let now = Timestamp::now();
                let rows = table.entry(key.clone()).or_default();
                for write in writes {
                    let row_key = (write.category_id.clone(), write.service_code.clone());
                    match rows.get_mut(&row_key) {
                        Some(row) => {
                            row.enabled = write.enabled;
                            if write.notes.is_some() {
                                row.notes = write.notes.clone();
                            }
                            row.updated_at = now;
                            row.updated_by = actor_id.to_string();
                        }
                        None => {
                            rows.insert(
                                row_key,
                                CoverageRow {
                                    category_id: write.category_id.clone(),
                                    service_code: write.service_code.clone(),
                                    enabled: write.enabled,
                                    notes: write.notes.clone(),
                                    created_at: now,
                                    updated_at: now,
                                    updated_by: actor_id.to_string(),
                                },
                            );
                        }
                    }
                }
                writes.len()
            })
        })
    }
}

impl AssignmentRepository for MemoryStore {
    fn find_active_for_user(&self, user_id: &UserId) -> Result<Option<Assignment>, StoreError> {
        Ok(self.assignments.get(user_id).and_then(|list| {
            list.into_iter()
                .find(|a| a.status == AssignmentStatus::Active)
        }))
    }
}

impl MasterDataRepository for MemoryStore {
    fn find_active_categories(
        &self,
        ids: Option<&[CategoryId]>,
    ) -> Result<Vec<Category>, StoreError> {
        let mut categories = self.categories.filter(|id, c| {
            c.is_active && ids.map_or(true, |wanted| wanted.contains(id))
        });
        categories.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.category_id.cmp(&b.category_id))
        });
        Ok(categories)
    }

    fn find_active_services(
        &self,
        category_ids: &[CategoryId],
        search_text: Option<&str>,
    ) -> Result<Vec<Service>, StoreError> {
        let needle = search_text
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let mut services = self.services.filter(|_, s| {
            s.is_active
                && category_ids.contains(&s.category_id)
                && needle.as_deref().map_or(true, |n| {
                    s.service_code.as_str().to_lowercase().contains(n)
                        || s.service_name.to_lowercase().contains(n)
                })
        });
        services.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.service_code.cmp(&b.service_code))
        });
        Ok(services)
    }
}
