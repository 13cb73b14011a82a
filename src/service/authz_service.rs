use crate::error::CoreError;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Admin,
    Instructor,
    Learner,
}

impl ActorRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "instructor" => Some(Self::Instructor),
            "learner" | "student" | "user" => Some(Self::Learner),
            _ => None,
        }
    }
}

/// Already-authenticated caller identity, plus request metadata kept for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: id.into(),
            role,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }
}

/// Reads the identity an upstream authenticator attached to the request.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, CoreError> {
    let id = header_value(headers, ACTOR_ID_HEADER)
        .ok_or_else(|| CoreError::Unauthorized(format!("missing {ACTOR_ID_HEADER} header")))?;
    let role = match header_value(headers, ACTOR_ROLE_HEADER) {
        Some(raw) => ActorRole::parse(&raw)
            .ok_or_else(|| CoreError::Unauthorized(format!("unknown actor role {raw:?}")))?,
        None => ActorRole::Learner,
    };
    let mut actor = Actor::new(id, role);
    actor.ip_address = header_value(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty());
    actor.user_agent = header_value(headers, "user-agent");
    Ok(actor)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

pub fn ensure_identified(actor: &Actor) -> Result<(), CoreError> {
    if actor.id.trim().is_empty() {
        return Err(CoreError::Unauthorized("caller identity is required".to_string()));
    }
    Ok(())
}

pub fn ensure_admin(actor: &Actor) -> Result<(), CoreError> {
    ensure_identified(actor)?;
    if !actor.is_admin() {
        return Err(CoreError::Forbidden("admin role required".to_string()));
    }
    Ok(())
}

pub fn ensure_owner_or_admin(actor: &Actor, owner_id: &str) -> Result<(), CoreError> {
    ensure_identified(actor)?;
    if actor.is_admin() || actor.id == owner_id {
        return Ok(());
    }
    Err(CoreError::Unauthorized(
        "only the course owner or an admin may modify this course".to_string(),
    ))
}
