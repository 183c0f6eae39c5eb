//! Bearer-token authentication for protected routes.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use mbg_core::AppError;
use mbg_observability::track_auth_failure;
use thiserror::Error;
use tracing::{debug, warn};

use crate::context::{Identity, RequestContext};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthHeaderError {
    #[error("Missing authorization header")]
    Missing,
    #[error("Invalid authorization header format")]
    InvalidFormat,
}

impl AuthHeaderError {
    pub fn reason(self) -> &'static str {
        match self {
            AuthHeaderError::Missing => "missing_header",
            AuthHeaderError::InvalidFormat => "invalid_header",
        }
    }
}

/// Token from an `Authorization` header of the exact form `Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthHeaderError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthHeaderError::Missing)?
        .to_str()
        .map_err(|_| AuthHeaderError::InvalidFormat)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthHeaderError::InvalidFormat),
    }
}

/// Verifies the bearer token and attaches the caller's [`Identity`] to the
/// request context. Rejects with 401 before the handler runs.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let trace_id = req
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.trace_id().to_string())
        .unwrap_or_default();

    let token = bearer_token(req.headers()).map_err(|err| {
        track_auth_failure(err.reason());
        warn!(trace_id = %trace_id, reason = err.reason(), path = %req.uri().path(), "Authentication failed");
        AppError::unauthorized(err.to_string())
    })?;

    let claims = state.verifier.verify(token).map_err(|err| {
        track_auth_failure(err.reason());
        warn!(trace_id = %trace_id, reason = err.reason(), error = %err, "Token verification failed");
        AppError::from(err)
    })?;

    let identity = Identity::from(claims);
    debug!(trace_id = %trace_id, user_id = %identity.user_id, role = %identity.role, "Authenticated request");

    match req.extensions_mut().get_mut::<RequestContext>() {
        Some(ctx) => ctx.set_identity(identity),
        None => return Err(AppError::internal(anyhow::anyhow!("request context missing"))),
    }

    Ok(next.run(req).await)
}
