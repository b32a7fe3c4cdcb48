//! # Application State
//!
//! One [`PlanEngine`] over a shared [`MemoryStore`]. Audit events go to an
//! in-memory log (readable through `/v1/audit`) and to the `audit` tracing
//! target.

use std::sync::Arc;

use obw_engine::{PlanEngine, Repositories};
use obw_store::{CompositeAuditSink, MemoryAuditLog, MemoryStore, TracingAuditSink};

use crate::config::ApiConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: PlanEngine,
    /// Kept for seeding policies, assignments and master data, which this
    /// service reads but does not own.
    pub store: MemoryStore,
    pub audit_log: MemoryAuditLog,
    pub config: ApiConfig,
}

impl AppState {
    /// Empty store, default configuration.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new(), ApiConfig::default())
    }

    pub fn with_store(store: MemoryStore, config: ApiConfig) -> Self {
        let audit_log = MemoryAuditLog::new();
        let sink = CompositeAuditSink::new(vec![
            Arc::new(audit_log.clone()),
            Arc::new(TracingAuditSink),
        ]);
        let engine = PlanEngine::new(Repositories::from_store(store.clone(), Arc::new(sink)));
        Self {
            engine,
            store,
            audit_log,
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
