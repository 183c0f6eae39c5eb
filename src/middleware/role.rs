//! Role gate for role-restricted route groups.
//!
//! Authorization is plain set membership: a caller passes when its role is in
//! the group's [`RoleSet`]. There is no hierarchy, so `super_admin` only passes
//! where it is listed.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use mbg_auth::RoleSet;
use mbg_core::AppError;
use mbg_observability::track_role_denial;
use thiserror::Error;
use tracing::warn;

use crate::context::RequestContext;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleDenied {
    #[error("User role not found in token")]
    RoleNotFound,
    #[error("Access denied. Required roles: {0}")]
    Insufficient(RoleSet),
}

impl From<RoleDenied> for AppError {
    fn from(err: RoleDenied) -> Self {
        AppError::forbidden(err.to_string())
    }
}

pub fn check_roles(ctx: Option<&RequestContext>, allowed: &RoleSet) -> Result<(), RoleDenied> {
    let role = ctx
        .and_then(RequestContext::user_role)
        .ok_or(RoleDenied::RoleNotFound)?;

    if allowed.allows(role) {
        Ok(())
    } else {
        Err(RoleDenied::Insufficient(allowed.clone()))
    }
}

/// Role set admitted by one route group, with the label used in logs and metrics.
#[derive(Debug, Clone)]
pub struct RoleGate {
    pub label: String,
    pub roles: RoleSet,
}

impl RoleGate {
    pub fn new(label: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            label: label.into(),
            roles,
        }
    }
}

pub async fn require_roles(
    State(gate): State<Arc<RoleGate>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = req.extensions().get::<RequestContext>();

    if let Err(denied) = check_roles(ctx, &gate.roles) {
        track_role_denial(&gate.label);
        warn!(
            trace_id = ctx.map(RequestContext::trace_id).unwrap_or_default(),
            user_id = ctx.and_then(RequestContext::user_id).unwrap_or_default(),
            role = ?ctx.and_then(RequestContext::user_role),
            group = %gate.label,
            required = %gate.roles,
            "Access denied"
        );
        return Err(denied.into());
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Identity;
    use mbg_auth::Role;

    fn ctx_with(role: Role) -> RequestContext {
        let mut ctx = RequestContext::new("trace-1");
        ctx.set_identity(Identity {
            user_id: "u1".to_string(),
            role,
            email: "u1@example.com".to_string(),
        });
        ctx
    }

    #[test]
    fn test_role_in_set_passes() {
        let allowed = RoleSet::from([Role::Admin, Role::SuperAdmin]);
        assert_eq!(check_roles(Some(&ctx_with(Role::Admin)), &allowed), Ok(()));
    }

    #[test]
    fn test_role_outside_set_is_denied() {
        let allowed = RoleSet::from([Role::Admin, Role::SuperAdmin]);
        let err = check_roles(Some(&ctx_with(Role::Parent)), &allowed).unwrap_err();
        assert_eq!(err.to_string(), "Access denied. Required roles: [admin super_admin]");
    }

    #[test]
    fn test_super_admin_not_implied() {
        let allowed = RoleSet::from([Role::Supplier]);
        assert!(check_roles(Some(&ctx_with(Role::SuperAdmin)), &allowed).is_err());
    }

    #[test]
    fn test_missing_identity() {
        let allowed = RoleSet::from([Role::Parent]);
        assert_eq!(
            check_roles(Some(&RequestContext::new("t")), &allowed),
            Err(RoleDenied::RoleNotFound)
        );
        assert_eq!(check_roles(None, &allowed), Err(RoleDenied::RoleNotFound));
    }

    #[test]
    fn test_denial_maps_to_forbidden() {
        let err = AppError::from(RoleDenied::RoleNotFound);
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
        assert_eq!(err.message, "User role not found in token");
    }
}
