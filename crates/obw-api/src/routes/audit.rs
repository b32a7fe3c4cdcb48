//! # Audit Trail
//!
//! - `GET /v1/audit` recorded events, newest first (`?resourceId=&limit=`)

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use obw_store::AuditEvent;

use crate::auth::{require_admin, Actor};
use crate::error::AppError;
use crate::extractors::extract_query;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/audit", get(list_events))
}

async fn list_events(
    State(state): State<AppState>,
    actor: Actor,
    query: Result<Query<AuditQuery>, QueryRejection>,
) -> Result<Json<Vec<AuditEvent>>, AppError> {
    require_admin(&actor)?;
    let query = extract_query(query)?;
    let events = state
        .audit_log
        .events()
        .into_iter()
        .rev()
        .filter(|e| {
            query
                .resource_id
                .as_deref()
                .map_or(true, |id| e.resource_id == id)
        })
        .take(query.limit.unwrap_or(DEFAULT_LIMIT))
        .collect();
    Ok(Json(events))
}
