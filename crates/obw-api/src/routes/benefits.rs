//! # Benefit Components
//!
//! - `GET /v1/policies/:policy_id/plan-versions/:version/benefit-components`
//! - `PUT /v1/policies/:policy_id/plan-versions/:version/benefit-components`

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use obw_store::{BenefitComponentSet, BenefitComponents};

use crate::auth::{require_admin, Actor};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_path, VersionPath};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateBenefitComponentsRequest {
    pub components: BenefitComponents,
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/policies/:policy_id/plan-versions/:version/benefit-components",
        get(get_components).put(update_components),
    )
}

async fn get_components(
    State(state): State<AppState>,
    path: Result<Path<VersionPath>, PathRejection>,
) -> Result<Json<BenefitComponentSet>, AppError> {
    let (policy_id, version) = extract_path(path)?;
    Ok(Json(state.engine.benefits.get(&policy_id, version)?))
}

async fn update_components(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<VersionPath>, PathRejection>,
    body: Result<Json<UpdateBenefitComponentsRequest>, JsonRejection>,
) -> Result<Json<BenefitComponentSet>, AppError> {
    require_admin(&actor)?;
    let (policy_id, version) = extract_path(path)?;
    let req = extract_json(body)?;
    Ok(Json(state.engine.benefits.update(
        &policy_id,
        version,
        req.components,
        actor.context(),
    )?))
}
