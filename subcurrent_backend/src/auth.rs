//! Caller identity resolution.
//!
//! Session issuance belongs to the auth collaborator; this module only
//! resolves already-issued bearer tokens against the sessions table. The
//! resolved identity is passed explicitly into the services instead of being
//! read from ambient request state.

use crate::database::repositories::SessionRepository;
use crate::database::Database;
use anyhow::Result;
use axum::http::{header, HeaderMap};

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: Option<String>,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Returns the caller behind the request's bearer token, or `None` when the
/// request carries no token or an unknown one.
pub fn resolve_session(database: &Database, headers: &HeaderMap) -> Result<Option<AuthUser>> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };
    let user = database.with_repositories(|repos| repos.sessions().resolve(token))?;
    Ok(user.map(|user| AuthUser {
        id: user.id,
        username: user.username,
    }))
}
