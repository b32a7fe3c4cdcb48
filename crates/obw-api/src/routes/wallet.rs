//! # Wallet Rules
//!
//! - `GET /v1/policies/:policy_id/plan-versions/:version/wallet-rules`
//! - `PUT /v1/policies/:policy_id/plan-versions/:version/wallet-rules`
//!
//! `GET` answers `null` when the version has no rules yet.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use obw_store::{WalletRuleSet, WalletRules};

use crate::auth::{require_admin, Actor};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_path, VersionPath};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/policies/:policy_id/plan-versions/:version/wallet-rules",
        get(get_rules).put(update_rules),
    )
}

async fn get_rules(
    State(state): State<AppState>,
    path: Result<Path<VersionPath>, PathRejection>,
) -> Result<Json<Option<WalletRuleSet>>, AppError> {
    let (policy_id, version) = extract_path(path)?;
    Ok(Json(state.engine.wallet.get(&policy_id, version)?))
}

async fn update_rules(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<VersionPath>, PathRejection>,
    body: Result<Json<WalletRules>, JsonRejection>,
) -> Result<Json<WalletRuleSet>, AppError> {
    require_admin(&actor)?;
    let (policy_id, version) = extract_path(path)?;
    let rules = extract_json(body)?;
    Ok(Json(state.engine.wallet.update(
        &policy_id,
        version,
        rules,
        actor.context(),
    )?))
}
