//! # Audit Events
//!
//! Every mutation the engine performs emits an [`AuditEvent`] through an
//! [`AuditSink`]. Sinks are fire-and-forget from the engine's point of
//! view: [`record_or_warn`] logs a failed write and carries on, so an audit
//! outage never fails the primary operation.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use obw_core::{ActorContext, Timestamp};

use crate::error::StoreError;

/// Audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    PlanVersionCreate,
    PlanVersionPublish,
    PlanVersionMakeCurrent,
    BenefitComponentsUpsert,
    WalletRulesUpsert,
    CoverageUpsert,
    CoverageBulkUpsert,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlanVersionCreate => "PLAN_VERSION_CREATE",
            Self::PlanVersionPublish => "PLAN_VERSION_PUBLISH",
            Self::PlanVersionMakeCurrent => "PLAN_VERSION_MAKE_CURRENT",
            Self::BenefitComponentsUpsert => "BENEFIT_COMPONENTS_UPSERT",
            Self::WalletRulesUpsert => "WALLET_RULES_UPSERT",
            Self::CoverageUpsert => "COVERAGE_UPSERT",
            Self::CoverageBulkUpsert => "COVERAGE_BULK_UPSERT",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit event to be recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: Uuid,
    pub at: Timestamp,
    pub actor: ActorContext,
    pub action: AuditAction,
    /// Resource family, e.g. `planVersions`.
    pub resource: String,
    /// Rendered resource key, e.g. `POL-1/v2`.
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,
    pub description: String,
}

impl AuditEvent {
    pub fn new(
        actor: &ActorContext,
        action: AuditAction,
        resource: impl Into<String>,
        resource_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            at: Timestamp::now(),
            actor: actor.clone(),
            action,
            resource: resource.into(),
            resource_id: resource_id.into(),
            before: None,
            after: None,
            description: description.into(),
        }
    }

    /// Attach a before-snapshot. Unserializable values are dropped.
    pub fn with_before<T: Serialize>(mut self, before: Option<&T>) -> Self {
        self.before = before.and_then(|b| serde_json::to_value(b).ok());
        self
    }

    /// Attach an after-snapshot. Unserializable values are dropped.
    pub fn with_after<T: Serialize>(mut self, after: &T) -> Self {
        self.after = serde_json::to_value(after).ok();
        self
    }
}

/// Destination for audit events.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent) -> Result<(), StoreError>;
}

/// Record an event, logging and swallowing any sink failure.
pub fn record_or_warn(sink: &dyn AuditSink, event: AuditEvent) {
    let action = event.action;
    let resource_id = event.resource_id.clone();
    if let Err(e) = sink.record(event) {
        tracing::warn!(
            action = %action,
            resource_id = %resource_id,
            error = %e,
            "audit write failed; continuing"
        );
    }
}

/// In-memory append-only audit log.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, event: AuditEvent) -> Result<(), StoreError> {
        self.events.write().push(event);
        Ok(())
    }
}

/// Writes audit events to the `audit` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) -> Result<(), StoreError> {
        tracing::info!(
            target: "audit",
            event_id = %event.id,
            action = %event.action,
            actor = %event.actor.id,
            role = %event.actor.role,
            resource = %event.resource,
            resource_id = %event.resource_id,
            "{}",
            event.description
        );
        Ok(())
    }
}

/// Fans an event out to several sinks. Fails if any sink fails, after
/// offering the event to all of them.
#[derive(Clone, Default)]
pub struct CompositeAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl CompositeAuditSink {
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }
}

impl AuditSink for CompositeAuditSink {
    fn record(&self, event: AuditEvent) -> Result<(), StoreError> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.record(event.clone()) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
