//! Caller role resolution and the admin guard.
//!
//! Role resolution happens once per request in a middleware; the
//! resolved [`Principal`] travels as a request extension. Mutating
//! handlers invoke the explicit [`Principal::require`] guard before
//! any other logic.

use std::collections::HashSet;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use thiserror::Error;

use super::state::ApiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Reader,
    Admin,
}

#[derive(Debug, Error)]
#[error("caller role does not satisfy `{required:?}`")]
pub struct RoleError {
    pub required: Role,
}

/// The caller identity resolved for one request.
#[derive(Debug, Clone)]
pub struct Principal {
    role: Role,
}

impl Principal {
    pub fn with_role(role: Role) -> Self {
        Self { role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Explicit guard comparing the resolved role against the required
    /// one. Admins satisfy every requirement; readers satisfy only
    /// reader-level access.
    pub fn require(&self, required: Role) -> Result<(), RoleError> {
        let satisfied = match required {
            Role::Reader => true,
            Role::Admin => self.role == Role::Admin,
        };
        if satisfied {
            Ok(())
        } else {
            Err(RoleError { required })
        }
    }
}

/// Maps bearer tokens to roles. Unknown or absent tokens resolve to
/// the reader role rather than an authentication failure, since every
/// read endpoint is public.
pub struct RoleResolver {
    admin_tokens: HashSet<String>,
}

impl RoleResolver {
    pub fn new(admin_tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            admin_tokens: admin_tokens.into_iter().collect(),
        }
    }

    pub fn resolve(&self, token: Option<&str>) -> Principal {
        let role = match token {
            Some(token) if self.admin_tokens.contains(token) => Role::Admin,
            _ => Role::Reader,
        };
        Principal::with_role(role)
    }
}

pub async fn authenticate(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = extract_token(request.headers().get(axum::http::header::AUTHORIZATION));
    let principal = state.roles.resolve(token.as_deref());
    request.extensions_mut().insert(principal);

    next.run(request).await
}

fn extract_token(header: Option<&axum::http::HeaderValue>) -> Option<String> {
    let raw = header?.to_str().ok()?;
    let bearer = raw.strip_prefix("Bearer ")?;
    Some(bearer.to_string())
}
