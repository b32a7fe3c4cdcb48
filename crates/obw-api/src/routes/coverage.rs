//! # Coverage Matrix
//!
//! - `GET  /v1/policies/:policy_id/plan-versions/:version/coverage`
//!   (`?categoryId=&searchText=&enabledOnly=`)
//! - `PUT  /v1/policies/:policy_id/plan-versions/:version/coverage`
//! - `POST /v1/policies/:policy_id/plan-versions/:version/coverage/bulk`
//! - `GET  /v1/policies/:policy_id/plan-versions/:version/coverage/categories`

use std::collections::HashSet;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use obw_core::CategoryId;
use obw_engine::{
    BulkCoverageResult, CategoryInfo, CoverageFilters, CoverageMatrixView, CoverageUpdateItem,
};

use crate::auth::{require_admin, Actor};
use crate::error::AppError;
use crate::extractors::{
    extract_path, extract_query, extract_validated_json, Validate, VersionPath,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateCoverageRequest {
    pub items: Vec<CoverageUpdateItem>,
}

impl Validate for UpdateCoverageRequest {
    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert((&item.category_id, &item.service_code)) {
                return Err(format!(
                    "duplicate item for {}/{}",
                    item.category_id, item.service_code
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCoverageRequest {
    pub category_ids: Vec<CategoryId>,
    pub enabled: bool,
}

impl Validate for BulkCoverageRequest {
    fn validate(&self) -> Result<(), String> {
        if self.category_ids.is_empty() {
            return Err("categoryIds must not be empty".to_string());
        }
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/policies/:policy_id/plan-versions/:version/coverage",
            get(get_matrix).put(update_matrix),
        )
        .route(
            "/v1/policies/:policy_id/plan-versions/:version/coverage/bulk",
            post(bulk_update),
        )
        .route(
            "/v1/policies/:policy_id/plan-versions/:version/coverage/categories",
            get(categories),
        )
}

async fn get_matrix(
    State(state): State<AppState>,
    path: Result<Path<VersionPath>, PathRejection>,
    query: Result<Query<CoverageFilters>, QueryRejection>,
) -> Result<Json<CoverageMatrixView>, AppError> {
    let (policy_id, version) = extract_path(path)?;
    let filters = extract_query(query)?;
    Ok(Json(
        state.engine.coverage.project(&policy_id, version, &filters)?,
    ))
}

async fn update_matrix(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<VersionPath>, PathRejection>,
    body: Result<Json<UpdateCoverageRequest>, JsonRejection>,
) -> Result<Json<CoverageMatrixView>, AppError> {
    require_admin(&actor)?;
    let (policy_id, version) = extract_path(path)?;
    let req = extract_validated_json(body)?;
    Ok(Json(state.engine.coverage.update(
        &policy_id,
        version,
        &req.items,
        actor.context(),
    )?))
}

async fn bulk_update(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<VersionPath>, PathRejection>,
    body: Result<Json<BulkCoverageRequest>, JsonRejection>,
) -> Result<Json<BulkCoverageResult>, AppError> {
    require_admin(&actor)?;
    let (policy_id, version) = extract_path(path)?;
    let req = extract_validated_json(body)?;
    Ok(Json(state.engine.coverage.bulk_set_for_categories(
        &policy_id,
        version,
        &req.category_ids,
        req.enabled,
        actor.context(),
    )?))
}

async fn categories(
    State(state): State<AppState>,
    path: Result<Path<VersionPath>, PathRejection>,
) -> Result<Json<Vec<CategoryInfo>>, AppError> {
    let (policy_id, version) = extract_path(path)?;
    Ok(Json(
        state
            .engine
            .coverage
            .categories_for_plan_version(&policy_id, version)?,
    ))
}
