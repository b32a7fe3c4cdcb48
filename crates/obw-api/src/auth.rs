//! # Actor Extraction
//!
//! Authentication happens upstream (gateway or session layer). This module
//! only reads the identity it forwards:
//!
//! - `x-actor-id` (required)
//! - `x-actor-email` (optional)
//! - `x-actor-role` (optional, defaults to `MEMBER`)
//!
//! Client IP (`x-forwarded-for`, first hop) and `user-agent` are attached to
//! the [`ActorContext`] for audit trails.

use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

use obw_core::{ActorContext, ActorRole};

use crate::error::AppError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_EMAIL_HEADER: &str = "x-actor-email";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The caller, as forwarded by the upstream auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub ActorContext);

impl Actor {
    pub fn context(&self) -> &ActorContext {
        &self.0
    }
}

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map(Actor)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn actor_from_headers(headers: &HeaderMap) -> Result<ActorContext, AppError> {
    let id = header_str(headers, ACTOR_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("missing x-actor-id header".into()))?;
    let role = match header_str(headers, ACTOR_ROLE_HEADER) {
        Some(raw) => raw.parse::<ActorRole>().map_err(AppError::Unauthorized)?,
        None => ActorRole::Member,
    };
    let email = header_str(headers, ACTOR_EMAIL_HEADER).unwrap_or_default();
    let ip = header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());
    let user_agent = header_str(headers, header::USER_AGENT.as_str()).map(str::to_string);

    Ok(ActorContext::new(id, email, role).with_request_meta(ip, user_agent))
}

/// Plan configuration is edited by administrators only.
pub fn require_admin(actor: &Actor) -> Result<(), AppError> {
    match actor.0.role {
        ActorRole::SuperAdmin | ActorRole::Admin | ActorRole::TpaAdmin | ActorRole::System => {
            Ok(())
        }
        role => Err(AppError::Forbidden(format!(
            "role '{role}' cannot modify plan configuration"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(*v));
        }
        map
    }

    #[test]
    fn test_missing_actor_id_is_unauthorized() {
        let err = actor_from_headers(&headers(&[])).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_full_actor_headers() {
        let actor = actor_from_headers(&headers(&[
            ("x-actor-id", "u-42"),
            ("x-actor-email", "ops@example.com"),
            ("x-actor-role", "super_admin"),
            ("x-forwarded-for", "10.0.0.1, 172.16.0.1"),
            ("user-agent", "curl/8"),
        ]))
        .unwrap();
        assert_eq!(actor.id, "u-42");
        assert_eq!(actor.role, ActorRole::SuperAdmin);
        assert_eq!(actor.ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(actor.user_agent.as_deref(), Some("curl/8"));
    }

    #[test]
    fn test_role_defaults_to_member_and_is_not_admin() {
        let actor = Actor(actor_from_headers(&headers(&[("x-actor-id", "m-1")])).unwrap());
        assert_eq!(actor.0.role, ActorRole::Member);
        assert!(matches!(require_admin(&actor), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let err = actor_from_headers(&headers(&[
            ("x-actor-id", "u-1"),
            ("x-actor-role", "janitor"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
