//! # Actor Context
//!
//! Who performed a mutation. Passed explicitly by the caller into every
//! write path and copied into audit events and `createdBy`/`updatedBy`
//! fields. Authentication happens upstream; this type only carries the
//! already-established identity.

use serde::{Deserialize, Serialize};

/// Roles recognised for audit attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    /// Platform super administrator.
    SuperAdmin,
    /// Policy administrator.
    Admin,
    /// Third-party administrator staff.
    TpaAdmin,
    /// Operations staff.
    Operations,
    /// A covered member.
    Member,
    /// Automated workflows (bootstrap, migrations).
    System,
}

impl ActorRole {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::Admin => "ADMIN",
            Self::TpaAdmin => "TPA_ADMIN",
            Self::Operations => "OPERATIONS",
            Self::Member => "MEMBER",
            Self::System => "SYSTEM",
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            "ADMIN" => Ok(Self::Admin),
            "TPA_ADMIN" => Ok(Self::TpaAdmin),
            "OPERATIONS" => Ok(Self::Operations),
            "MEMBER" => Ok(Self::Member),
            "SYSTEM" => Ok(Self::System),
            other => Err(format!("unknown actor role: {other}")),
        }
    }
}

/// The identity a mutation is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorContext {
    /// Stable user id of the actor.
    pub id: String,
    /// Actor email, for human-readable audit trails.
    pub email: String,
    /// Actor role at the time of the request.
    pub role: ActorRole,
    /// Client IP, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Client user agent, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ActorContext {
    /// An actor with no request metadata.
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
            ip: None,
            user_agent: None,
        }
    }

    /// The actor used by automated workflows.
    pub fn system() -> Self {
        Self::new("SYSTEM", "system@localhost", ActorRole::System)
    }

    /// Attach request metadata.
    pub fn with_request_meta(mut self, ip: Option<String>, user_agent: Option<String>) -> Self {
        self.ip = ip;
        self.user_agent = user_agent;
        self
    }
}
