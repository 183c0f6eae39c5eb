//! Per-request context.
//!
//! The trace stage inserts one [`RequestContext`] into the request extensions;
//! the timeout stage records the deadline on it and the auth stage attaches the
//! caller's [`Identity`]. Handlers read it through the [`RequestContext`] and
//! [`AuthUser`] extractors instead of looking up loose keys.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::{extract::FromRequestParts, http::request::Parts};
use mbg_auth::{IdentityClaims, Role};
use mbg_core::AppError;
use serde::Serialize;
use utoipa::ToSchema;

/// The authenticated caller, taken from verified token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    pub email: String,
}

impl From<IdentityClaims> for Identity {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            email: claims.email,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    trace_id: String,
    timeout: Option<Duration>,
    identity: Option<Identity>,
}

impl RequestContext {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            timeout: None,
            identity: None,
        }
    }

    /// Context of a request whose token has already been verified.
    pub fn authenticated(trace_id: impl Into<String>, identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            ..Self::new(trace_id)
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.user_id.as_str())
    }

    pub fn user_role(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.role)
    }

    pub fn user_email(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.email.as_str())
    }

    pub(crate) fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub(crate) fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("request context missing")))
    }
}

/// Extractor for handlers that need a caller. Rejects with 401 when the request
/// carries no identity.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.0.user_id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|ctx| ctx.identity().cloned())
            .map(AuthUser)
            .ok_or_else(|| AppError::unauthorized("User not authenticated"))
    }
}

/// Write-once holder for the trace id, shared between the recovery stage and
/// the trace stage so a recovered panic reports the id the request was logged
/// under.
#[derive(Debug, Clone, Default)]
pub struct TraceSlot(Arc<OnceLock<String>>);

impl TraceSlot {
    pub fn set(&self, trace_id: &str) {
        let _ = self.0.set(trace_id.to_string());
    }

    pub fn get(&self) -> Option<&str> {
        self.0.get().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn identity() -> Identity {
        Identity {
            user_id: "user-1".to_string(),
            role: Role::Supplier,
            email: "supplier@example.com".to_string(),
        }
    }

    #[test]
    fn test_new_context_is_unauthenticated() {
        let ctx = RequestContext::new("trace-1");
        assert_eq!(ctx.trace_id(), "trace-1");
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.user_id(), None);
        assert_eq!(ctx.user_role(), None);
        assert_eq!(ctx.timeout(), None);
    }

    #[test]
    fn test_identity_accessors() {
        let mut ctx = RequestContext::new("trace-1");
        ctx.set_identity(identity());
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.user_id(), Some("user-1"));
        assert_eq!(ctx.user_role(), Some(Role::Supplier));
        assert_eq!(ctx.user_email(), Some("supplier@example.com"));
    }

    #[test]
    fn test_trace_slot_is_write_once() {
        let slot = TraceSlot::default();
        assert_eq!(slot.get(), None);
        slot.set("first");
        slot.set("second");
        assert_eq!(slot.clone().get(), Some("first"));
    }

    #[tokio::test]
    async fn test_auth_user_requires_identity() {
        let (mut parts, _) = Request::new(()).into_parts();
        parts.extensions.insert(RequestContext::new("trace-1"));
        let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.message, "User not authenticated");

        let mut ctx = RequestContext::new("trace-1");
        ctx.set_identity(identity());
        parts.extensions.insert(ctx);
        let user = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.role(), Role::Supplier);
    }

    #[tokio::test]
    async fn test_context_extractor_fails_without_pipeline() {
        let (mut parts, _) = Request::new(()).into_parts();
        let err = RequestContext::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
