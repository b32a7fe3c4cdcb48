//! # Plan Version Lifecycle
//!
//! The only component that changes a plan version's status or a policy's
//! current-version pointer.
//!
//! - **create** numbers versions densely per policy (`max + 1`) and inserts
//!   them as DRAFT. Two concurrent creates race on the store's unique key;
//!   the loser gets a Conflict and may retry.
//! - **publish** is gated by the [`ReadinessEvaluator`]: a BLOCKED report
//!   aborts before any status change and is returned whole.
//! - **make current** repoints the policy at a PUBLISHED version that is in
//!   force today. It never touches the version itself.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use obw_core::{ActorContext, EffectiveWindow, PlanVersionNumber, PolicyId};
use obw_state::{PlanVersion, PlanVersionStatus};
use obw_store::{AuditAction, AuditEvent, Policy};

use crate::context::Repositories;
use crate::error::EngineError;
use crate::readiness::ReadinessEvaluator;

const DEFAULT_PAGE_LIMIT: u32 = 10;
const MAX_PAGE_LIMIT: u32 = 100;

/// Paging and filtering for [`PlanVersionLifecycle::list_versions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionListQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub status: Option<PlanVersionStatus>,
}

/// One page of versions, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPage {
    pub data: Vec<PlanVersion>,
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Clone)]
pub struct PlanVersionLifecycle {
    repos: Repositories,
    readiness: ReadinessEvaluator,
}

impl PlanVersionLifecycle {
    pub fn new(repos: Repositories, readiness: ReadinessEvaluator) -> Self {
        Self { repos, readiness }
    }

    /// Create the next DRAFT version of a policy.
    pub fn create_draft(
        &self,
        policy_id: &PolicyId,
        effective_from: NaiveDate,
        effective_to: Option<NaiveDate>,
        actor: &ActorContext,
    ) -> Result<PlanVersion, EngineError> {
        let policy = self.repos.require_policy(policy_id)?;
        let window = EffectiveWindow::new(effective_from, effective_to)
            .map_err(|e| EngineError::BadRequest(e.to_string()))?;

        let max = self.repos.plan_versions.find_max_version(policy_id)?;
        let number = PlanVersionNumber::new(i64::from(max) + 1)?;
        let version = PlanVersion::new_draft(policy_id.clone(), number, window, actor);
        self.repos.plan_versions.insert_plan_version(version.clone())?;

        tracing::info!(
            policy_id = %policy_id,
            plan_version = %number,
            actor = %actor.id,
            "plan version created"
        );
        self.repos.audit(
            AuditEvent::new(
                actor,
                AuditAction::PlanVersionCreate,
                "planVersions",
                format!("{policy_id}/v{number}"),
                format!(
                    "Created plan version {number} for policy {}",
                    policy.policy_number
                ),
            )
            .with_after(&version),
        );
        Ok(version)
    }

    /// Bootstrap version 1 of a new policy as PUBLISHED over the policy's
    /// own window. Returns the existing version 1 if there is one.
    pub fn create_initial_version(
        &self,
        policy_id: &PolicyId,
        actor: &ActorContext,
    ) -> Result<PlanVersion, EngineError> {
        let policy = self.repos.require_policy(policy_id)?;
        if let Some(existing) = self
            .repos
            .plan_versions
            .find_plan_version(policy_id, PlanVersionNumber::FIRST)?
        {
            return Ok(existing);
        }

        let version = PlanVersion::new_initial_published(policy_id.clone(), policy.window, actor);
        match self.repos.plan_versions.insert_plan_version(version.clone()) {
            Ok(()) => {}
            Err(obw_store::StoreError::Duplicate { .. }) => {
                // Lost the race to a concurrent bootstrap; theirs stands.
                return self
                    .repos
                    .require_plan_version(policy_id, PlanVersionNumber::FIRST);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            policy_id = %policy_id,
            actor = %actor.id,
            "initial plan version created"
        );
        self.repos.audit(
            AuditEvent::new(
                actor,
                AuditAction::PlanVersionCreate,
                "planVersions",
                format!("{policy_id}/v1"),
                format!(
                    "Created initial plan version for policy {}",
                    policy.policy_number
                ),
            )
            .with_after(&version),
        );
        Ok(version)
    }

    /// Publish a DRAFT version whose readiness is READY.
    pub fn publish(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        actor: &ActorContext,
    ) -> Result<PlanVersion, EngineError> {
        let before = self.repos.require_plan_version(policy_id, version)?;
        if !before.is_draft() {
            return Err(EngineError::BadRequest(
                "Only draft versions can be published".into(),
            ));
        }

        let report = self.readiness.evaluate(policy_id, version)?;
        if !report.is_ready() {
            tracing::warn!(
                policy_id = %policy_id,
                plan_version = %version,
                actor = %actor.id,
                failed = ?report.failure_messages(),
                "publish blocked by readiness"
            );
            return Err(EngineError::ReadinessBlocked(report));
        }

        let after = self
            .repos
            .plan_versions
            .update_plan_version(policy_id, version, &mut |pv: &mut PlanVersion| {
                pv.publish(actor)
            })?;

        tracing::info!(
            policy_id = %policy_id,
            plan_version = %version,
            actor = %actor.id,
            "plan version published"
        );
        self.repos.audit(
            AuditEvent::new(
                actor,
                AuditAction::PlanVersionPublish,
                "planVersions",
                format!("{policy_id}/v{version}"),
                format!("Published plan version {version}"),
            )
            .with_before(Some(&before))
            .with_after(&after),
        );
        Ok(after)
    }

    /// Make a PUBLISHED, in-force version the policy's current version.
    pub fn make_current(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        actor: &ActorContext,
    ) -> Result<Policy, EngineError> {
        self.make_current_on(policy_id, version, actor, Utc::now().date_naive())
    }

    /// Alias of [`Self::make_current`].
    pub fn set_current_version(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        actor: &ActorContext,
    ) -> Result<Policy, EngineError> {
        self.make_current(policy_id, version, actor)
    }

    /// [`Self::make_current`] with an explicit calendar day for "today".
    pub fn make_current_on(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
        actor: &ActorContext,
        today: NaiveDate,
    ) -> Result<Policy, EngineError> {
        let (mut policy, target) = self.repos.require_policy_and_version(policy_id, version)?;
        if target.status != PlanVersionStatus::Published {
            return Err(EngineError::BadRequest(
                "Only published versions can be made current".into(),
            ));
        }
        if target.window.starts_after(today) {
            return Err(EngineError::BadRequest(
                "Cannot make a future version current".into(),
            ));
        }
        if target.window.ended_before(today) {
            return Err(EngineError::BadRequest(
                "Cannot make an expired version current".into(),
            ));
        }

        let previous = self
            .repos
            .policies
            .update_current_version(policy_id, version)?;
        policy.current_plan_version = Some(version);

        tracing::info!(
            policy_id = %policy_id,
            plan_version = %version,
            previous = ?previous.map(|v| v.get()),
            actor = %actor.id,
            "current plan version changed"
        );
        self.repos.audit(
            AuditEvent::new(
                actor,
                AuditAction::PlanVersionMakeCurrent,
                "policies",
                policy_id.to_string(),
                format!(
                    "Set current plan version of policy {} to {version}",
                    policy.policy_number
                ),
            )
            .with_before(Some(&serde_json::json!({ "currentPlanVersion": previous })))
            .with_after(&serde_json::json!({ "currentPlanVersion": version })),
        );
        Ok(policy)
    }

    /// A single version.
    pub fn get_version(
        &self,
        policy_id: &PolicyId,
        version: PlanVersionNumber,
    ) -> Result<PlanVersion, EngineError> {
        self.repos.require_plan_version(policy_id, version)
    }

    /// Versions of a policy, newest first, one page at a time.
    pub fn list_versions(
        &self,
        policy_id: &PolicyId,
        query: &VersionListQuery,
    ) -> Result<VersionPage, EngineError> {
        self.repos.require_policy(policy_id)?;
        let page = query.page.filter(|p| *p > 0).unwrap_or(1);
        let limit = query
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_PAGE_LIMIT);

        let all = self
            .repos
            .plan_versions
            .list_plan_versions(policy_id, query.status)?;
        let total = all.len();
        let pages = total.div_ceil(limit as usize);
        let data = all
            .into_iter()
            .skip((page as usize - 1) * limit as usize)
            .take(limit as usize)
            .collect();

        Ok(VersionPage {
            data,
            page,
            limit,
            total,
            pages,
        })
    }

    /// The policy's current version, falling back to version 1.
    pub fn find_current_version(&self, policy_id: &PolicyId) -> Result<PlanVersion, EngineError> {
        let policy = self.repos.require_policy(policy_id)?;
        let number = policy
            .current_plan_version
            .unwrap_or(PlanVersionNumber::FIRST);
        self.repos.require_plan_version(policy_id, number)
    }
}
