//! # obw-api: HTTP Adapter for the Plan Engine
//!
//! Thin Axum layer over `obw-engine`. Handlers parse input, resolve the
//! caller, delegate to one engine operation and map its error. No business
//! rule lives here.
//!
//! ## API Surface
//!
//! | Prefix                                              | Module                    |
//! |-----------------------------------------------------|---------------------------|
//! | `/v1/policies/:id/plan-versions/*`                  | [`routes::plan_versions`] |
//! | `/v1/policies/:id/plan-versions/:v/benefit-components` | [`routes::benefits`]   |
//! | `/v1/policies/:id/plan-versions/:v/wallet-rules`    | [`routes::wallet`]        |
//! | `/v1/policies/:id/plan-versions/:v/coverage/*`      | [`routes::coverage`]      |
//! | `/v1/policies/:id/plan-versions/:v/config`, `/v1/members/*` | [`routes::members`] |
//! | `/v1/audit`                                         | [`routes::audit`]         |
//! | `/health/*`                                         | liveness/readiness probes |
//!
//! Caller identity arrives in `x-actor-*` headers (see [`auth`]).

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::AppState;

/// Assemble the router with every route and middleware.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    let api = Router::new()
        .merge(routes::plan_versions::router())
        .merge(routes::benefits::router())
        .merge(routes::wallet::router())
        .merge(routes::coverage::router())
        .merge(routes::members::router())
        .merge(routes::audit::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

async fn liveness() -> &'static str {
    "ok"
}

async fn readiness() -> &'static str {
    "ready"
}
