//! # Plan Versions
//!
//! Lifecycle endpoints for a policy's plan versions.
//!
//! - `GET  /v1/policies/:policy_id/plan-versions` list (paged, `?status=`)
//! - `POST /v1/policies/:policy_id/plan-versions` create DRAFT
//! - `POST /v1/policies/:policy_id/plan-versions/initial` bootstrap version 1
//! - `GET  /v1/policies/:policy_id/plan-versions/current`
//! - `GET  /v1/policies/:policy_id/plan-versions/:version`
//! - `POST /v1/policies/:policy_id/plan-versions/:version/publish`
//! - `POST /v1/policies/:policy_id/plan-versions/:version/make-current`
//! - `GET  /v1/policies/:policy_id/plan-versions/:version/readiness`
//! - `GET  /v1/policies/:policy_id/plan-versions/:version/publish-readiness`

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use obw_core::PolicyId;
use obw_engine::{PublishReadiness, ReadinessReport, VersionListQuery, VersionPage};
use obw_state::PlanVersion;
use obw_store::Policy;

use crate::auth::{require_admin, Actor};
use crate::error::AppError;
use crate::extractors::{
    extract_path, extract_query, extract_validated_json, Validate, VersionPath,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanVersionRequest {
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
}

impl Validate for CreatePlanVersionRequest {
    fn validate(&self) -> Result<(), String> {
        match self.effective_to {
            Some(to) if to < self.effective_from => {
                Err("effectiveTo must not be before effectiveFrom".to_string())
            }
            _ => Ok(()),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/policies/:policy_id/plan-versions",
            get(list_versions).post(create_version),
        )
        .route(
            "/v1/policies/:policy_id/plan-versions/initial",
            post(create_initial_version),
        )
        .route(
            "/v1/policies/:policy_id/plan-versions/current",
            get(current_version),
        )
        .route(
            "/v1/policies/:policy_id/plan-versions/:version",
            get(get_version),
        )
        .route(
            "/v1/policies/:policy_id/plan-versions/:version/publish",
            post(publish_version),
        )
        .route(
            "/v1/policies/:policy_id/plan-versions/:version/make-current",
            post(make_current),
        )
        .route(
            "/v1/policies/:policy_id/plan-versions/:version/readiness",
            get(readiness),
        )
        .route(
            "/v1/policies/:policy_id/plan-versions/:version/publish-readiness",
            get(publish_readiness),
        )
}

async fn list_versions(
    State(state): State<AppState>,
    path: Result<Path<PolicyId>, PathRejection>,
    query: Result<Query<VersionListQuery>, QueryRejection>,
) -> Result<Json<VersionPage>, AppError> {
    let policy_id = extract_path(path)?;
    let query = extract_query(query)?;
    Ok(Json(
        state.engine.lifecycle.list_versions(&policy_id, &query)?,
    ))
}

async fn create_version(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<PolicyId>, PathRejection>,
    body: Result<Json<CreatePlanVersionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PlanVersion>), AppError> {
    require_admin(&actor)?;
    let policy_id = extract_path(path)?;
    let req = extract_validated_json(body)?;
    let version = state.engine.lifecycle.create_draft(
        &policy_id,
        req.effective_from,
        req.effective_to,
        actor.context(),
    )?;
    Ok((StatusCode::CREATED, Json(version)))
}

async fn create_initial_version(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<PolicyId>, PathRejection>,
) -> Result<Json<PlanVersion>, AppError> {
    require_admin(&actor)?;
    let policy_id = extract_path(path)?;
    Ok(Json(
        state
            .engine
            .lifecycle
            .create_initial_version(&policy_id, actor.context())?,
    ))
}

async fn current_version(
    State(state): State<AppState>,
    path: Result<Path<PolicyId>, PathRejection>,
) -> Result<Json<PlanVersion>, AppError> {
    let policy_id = extract_path(path)?;
    Ok(Json(state.engine.lifecycle.find_current_version(&policy_id)?))
}

async fn get_version(
    State(state): State<AppState>,
    path: Result<Path<VersionPath>, PathRejection>,
) -> Result<Json<PlanVersion>, AppError> {
    let (policy_id, version) = extract_path(path)?;
    Ok(Json(state.engine.lifecycle.get_version(&policy_id, version)?))
}

async fn publish_version(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<VersionPath>, PathRejection>,
) -> Result<Json<PlanVersion>, AppError> {
    require_admin(&actor)?;
    let (policy_id, version) = extract_path(path)?;
    Ok(Json(
        state
            .engine
            .lifecycle
            .publish(&policy_id, version, actor.context())?,
    ))
}

async fn make_current(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<VersionPath>, PathRejection>,
) -> Result<Json<Policy>, AppError> {
    require_admin(&actor)?;
    let (policy_id, version) = extract_path(path)?;
    Ok(Json(
        state
            .engine
            .lifecycle
            .make_current(&policy_id, version, actor.context())?,
    ))
}

async fn readiness(
    State(state): State<AppState>,
    path: Result<Path<VersionPath>, PathRejection>,
) -> Result<Json<ReadinessReport>, AppError> {
    let (policy_id, version) = extract_path(path)?;
    Ok(Json(state.engine.readiness.evaluate(&policy_id, version)?))
}

async fn publish_readiness(
    State(state): State<AppState>,
    path: Result<Path<VersionPath>, PathRejection>,
) -> Result<Json<PublishReadiness>, AppError> {
    let (policy_id, version) = extract_path(path)?;
    Ok(Json(
        state
            .engine
            .resolver
            .check_publish_readiness(&policy_id, version)?,
    ))
}
