//! # Extraction Helpers
//!
//! Handlers take `Result<Json<T>, JsonRejection>` (and the same for
//! `Path`/`Query`) so that rejections come back in the standard
//! [`ErrorBody`](crate::error::ErrorBody) shape instead of axum's plain
//! text.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;

use obw_core::{PlanVersionNumber, PolicyId};

use crate::error::AppError;

/// Business rules a request body must satisfy beyond what serde checks.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    result
        .map(|Path(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// `/v1/policies/:policy_id/plan-versions/:version` path parameters.
pub type VersionPath = (PolicyId, PlanVersionNumber);
