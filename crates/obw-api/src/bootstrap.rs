//! # Startup Bootstrap
//!
//! Builds the [`AppState`] from configuration. With `OBW_SEED_DEMO=true`
//! the store is loaded with the reference category/service catalogue, one
//! demo policy whose version 1 is published and current, and one member
//! assigned to it.

use chrono::NaiveDate;
use thiserror::Error;

use obw_core::{ActorContext, EffectiveWindow, PolicyId, UserId, ValidationError};
use obw_engine::EngineError;
use obw_store::{Assignment, AssignmentStatus, MemoryStore, Policy};

use crate::config::ApiConfig;
use crate::state::AppState;

pub const DEMO_POLICY_ID: &str = "POL-DEMO-001";
pub const DEMO_MEMBER_ID: &str = "MEM-DEMO-001";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid seed data: {0}")]
    SeedData(#[from] ValidationError),

    #[error("seeding failed: {0}")]
    Engine(#[from] EngineError),
}

pub fn bootstrap(config: ApiConfig) -> Result<AppState, BootstrapError> {
    if !config.seed_demo {
        tracing::info!("starting with an empty store");
        return Ok(AppState::with_store(MemoryStore::new(), config));
    }

    let state = AppState::with_store(MemoryStore::with_reference_master_data()?, config);
    seed_demo(&state)?;
    Ok(state)
}

fn seed_demo(state: &AppState) -> Result<(), BootstrapError> {
    let policy_id = PolicyId::new(DEMO_POLICY_ID)?;
    let from = NaiveDate::from_ymd_opt(2025, 1, 1).ok_or_else(|| {
        ValidationError::InvalidTimestamp {
            value: "2025-01-01".into(),
            reason: "out of range".into(),
        }
    })?;

    state.store.insert_policy(Policy {
        id: policy_id.clone(),
        policy_number: DEMO_POLICY_ID.into(),
        name: "Demo Corporate Outpatient Plan".into(),
        window: EffectiveWindow::starting(from),
        current_plan_version: None,
    });

    let system = ActorContext::system();
    let v1 = state
        .engine
        .lifecycle
        .create_initial_version(&policy_id, &system)?;
    state
        .engine
        .lifecycle
        .make_current(&policy_id, v1.plan_version, &system)?;

    state.store.insert_assignment(Assignment {
        user_id: UserId::new(DEMO_MEMBER_ID)?,
        policy_id: policy_id.clone(),
        status: AssignmentStatus::Active,
        window: EffectiveWindow::starting(from),
        plan_version: None,
    });

    tracing::info!(
        policy_id = %policy_id,
        member = DEMO_MEMBER_ID,
        "seeded demo data"
    );
    Ok(())
}
