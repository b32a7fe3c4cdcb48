//! # Plan Version Lifecycle
//!
//! A plan version is keyed by `(policyId, planVersion)` and is never
//! deleted. Its status moves `DRAFT → PUBLISHED → ARCHIVED`.
//!
//! Version 1 of a freshly created policy is bootstrapped directly as
//! PUBLISHED (see [`PlanVersion::new_initial_published`]); every later
//! version is born DRAFT.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use obw_core::{ActorContext, EffectiveWindow, PlanVersionNumber, PolicyId, Timestamp};

// ─── Status ──────────────────────────────────────────────────────────

/// The lifecycle status of a plan version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanVersionStatus {
    /// Being configured; sub-configurations are editable.
    Draft,
    /// Frozen and eligible to become the policy's current version.
    Published,
    /// Retired (terminal).
    Archived,
}

impl PlanVersionStatus {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Archived)
    }

    /// Whether sub-configurations may be edited.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Position in the forward-only ordering.
    fn rank(&self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Published => 1,
            Self::Archived => 2,
        }
    }

    /// Whether `to` is the immediate successor of this state.
    pub fn can_transition_to(&self, to: PlanVersionStatus) -> bool {
        to.rank() == self.rank() + 1
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
            Self::Archived => "ARCHIVED",
        }
    }
}

impl std::fmt::Display for PlanVersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanVersionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(Self::Draft),
            "PUBLISHED" => Ok(Self::Published),
            "ARCHIVED" => Ok(Self::Archived),
            other => Err(format!("unknown plan version status: {other}")),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by plan version transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanVersionError {
    /// The requested transition is not the forward successor of the current state.
    #[error("invalid plan version transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: PlanVersionStatus,
        /// Attempted target state.
        to: PlanVersionStatus,
    },

    /// The version is archived.
    #[error("plan version is in terminal state {state}")]
    TerminalState {
        /// The terminal state.
        state: PlanVersionStatus,
    },
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a plan version state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanVersionTransitionRecord {
    /// State before the transition.
    pub from_state: PlanVersionStatus,
    /// State after the transition.
    pub to_state: PlanVersionStatus,
    /// When the transition occurred.
    pub at: Timestamp,
    /// Actor id that performed it.
    pub actor: String,
}

// ─── Plan Version ────────────────────────────────────────────────────

/// A plan version record with its lifecycle state and transition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanVersion {
    /// Owning policy.
    pub policy_id: PolicyId,
    /// Version number within the policy.
    pub plan_version: PlanVersionNumber,
    /// Current lifecycle state.
    pub status: PlanVersionStatus,
    /// Calendar window this version is in force for.
    #[serde(flatten)]
    pub window: EffectiveWindow,
    /// When the version was published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
    /// Who published it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_by: Option<String>,
    /// Who created it.
    pub created_by: String,
    /// Who last touched the record.
    pub updated_by: String,
    /// Creation instant.
    pub created_at: Timestamp,
    /// Last update instant.
    pub updated_at: Timestamp,
    /// Ordered log of state transitions.
    #[serde(default)]
    pub transitions: Vec<PlanVersionTransitionRecord>,
}

impl PlanVersion {
    /// A new DRAFT version.
    pub fn new_draft(
        policy_id: PolicyId,
        plan_version: PlanVersionNumber,
        window: EffectiveWindow,
        actor: &ActorContext,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            policy_id,
            plan_version,
            status: PlanVersionStatus::Draft,
            window,
            published_at: None,
            published_by: None,
            created_by: actor.id.clone(),
            updated_by: actor.id.clone(),
            created_at: now,
            updated_at: now,
            transitions: Vec::new(),
        }
    }

    /// Version 1 of a new policy, created already PUBLISHED.
    ///
    /// Recorded as a DRAFT → PUBLISHED transition so the log stays complete.
    pub fn new_initial_published(
        policy_id: PolicyId,
        window: EffectiveWindow,
        actor: &ActorContext,
    ) -> Self {
        let mut version = Self::new_draft(policy_id, PlanVersionNumber::FIRST, window, actor);
        version.do_transition(PlanVersionStatus::Published, actor);
        version.published_at = Some(version.updated_at);
        version.published_by = Some(actor.id.clone());
        version
    }

    /// Publish the version (DRAFT → PUBLISHED).
    pub fn publish(&mut self, actor: &ActorContext) -> Result<(), PlanVersionError> {
        self.require_state(PlanVersionStatus::Draft, PlanVersionStatus::Published)?;
        self.do_transition(PlanVersionStatus::Published, actor);
        self.published_at = Some(self.updated_at);
        self.published_by = Some(actor.id.clone());
        Ok(())
    }

    /// Archive the version (PUBLISHED → ARCHIVED).
    pub fn archive(&mut self, actor: &ActorContext) -> Result<(), PlanVersionError> {
        self.require_state(PlanVersionStatus::Published, PlanVersionStatus::Archived)?;
        self.do_transition(PlanVersionStatus::Archived, actor);
        Ok(())
    }

    /// Whether the version is currently DRAFT.
    pub fn is_draft(&self) -> bool {
        self.status == PlanVersionStatus::Draft
    }

    fn require_state(
        &self,
        expected: PlanVersionStatus,
        target: PlanVersionStatus,
    ) -> Result<(), PlanVersionError> {
        if self.status.is_terminal() {
            return Err(PlanVersionError::TerminalState { state: self.status });
        }
        if self.status != expected || !self.status.can_transition_to(target) {
            return Err(PlanVersionError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        Ok(())
    }

    fn do_transition(&mut self, to: PlanVersionStatus, actor: &ActorContext) {
        let now = Timestamp::now();
        self.transitions.push(PlanVersionTransitionRecord {
            from_state: self.status,
            to_state: to,
            at: now,
            actor: actor.id.clone(),
        });
        self.status = to;
        self.updated_at = now;
        self.updated_by = actor.id.clone();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
