//! # Effective Configuration and Member Views
//!
//! - `GET /v1/policies/:policy_id/plan-versions/:version/config` admin view
//! - `GET /v1/members/:user_id/config`
//! - `GET /v1/members/:user_id/benefit-components`
//! - `GET /v1/members/:user_id/wallet-rules` (`null` without assignment)
//! - `GET /v1/members/:user_id/coverage` (`null` without assignment)
//!
//! Members may read only their own views; staff may read any.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use obw_core::{ActorRole, UserId};
use obw_engine::{CoverageMatrixView, EffectiveConfig};
use obw_store::{BenefitComponents, WalletRuleSet};

use crate::auth::Actor;
use crate::error::AppError;
use crate::extractors::{extract_path, VersionPath};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/policies/:policy_id/plan-versions/:version/config",
            get(admin_config),
        )
        .route("/v1/members/:user_id/config", get(member_config))
        .route(
            "/v1/members/:user_id/benefit-components",
            get(member_benefits),
        )
        .route("/v1/members/:user_id/wallet-rules", get(member_wallet))
        .route("/v1/members/:user_id/coverage", get(member_coverage))
}

fn require_self_or_staff(actor: &Actor, user_id: &UserId) -> Result<(), AppError> {
    match actor.0.role {
        ActorRole::Member if actor.0.id != user_id.as_str() => Err(AppError::Forbidden(
            "members may only read their own configuration".into(),
        )),
        _ => Ok(()),
    }
}

async fn admin_config(
    State(state): State<AppState>,
    path: Result<Path<VersionPath>, PathRejection>,
) -> Result<Json<EffectiveConfig>, AppError> {
    let (policy_id, version) = extract_path(path)?;
    Ok(Json(
        state.engine.resolver.resolve_for_admin(&policy_id, version)?,
    ))
}

async fn member_config(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<EffectiveConfig>, AppError> {
    let user_id = extract_path(path)?;
    require_self_or_staff(&actor, &user_id)?;
    Ok(Json(state.engine.resolver.resolve_for_member(&user_id)?))
}

async fn member_benefits(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<BenefitComponents>, AppError> {
    let user_id = extract_path(path)?;
    require_self_or_staff(&actor, &user_id)?;
    Ok(Json(state.engine.benefits.get_for_member(&user_id)?))
}

async fn member_wallet(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Option<WalletRuleSet>>, AppError> {
    let user_id = extract_path(path)?;
    require_self_or_staff(&actor, &user_id)?;
    Ok(Json(state.engine.wallet.get_for_member(&user_id)?))
}

async fn member_coverage(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Option<CoverageMatrixView>>, AppError> {
    let user_id = extract_path(path)?;
    require_self_or_staff(&actor, &user_id)?;
    Ok(Json(state.engine.coverage.member_coverage(&user_id)?))
}
