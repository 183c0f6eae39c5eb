use mbg_auth::Role;
use mbg_core::{Envelope, ErrorBody, ErrorCode, Meta};
use mbg_db::PoolHealth;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::context::Identity;
use crate::modules::auth::model::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshTokenRequest, RefreshTokenResponse,
    UserSummary,
};
use crate::modules::health::model::{HealthDetailsResponse, HealthResponse, ReadyResponse};
use crate::modules::roles::model::{RoleCatalogue, RoleInfo};
use crate::modules::session::model::SessionStatus;
use crate::policy::RouteGroup;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health,
        crate::modules::health::controller::ready,
        crate::modules::health::controller::health_details,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::logout,
        crate::modules::session::controller::session_status,
        crate::modules::roles::controller::list_roles,
    ),
    components(
        schemas(
            Envelope,
            ErrorBody,
            ErrorCode,
            Meta,
            Role,
            RouteGroup,
            Identity,
            PoolHealth,
            LoginRequest,
            LoginResponse,
            RefreshTokenRequest,
            RefreshTokenResponse,
            LogoutResponse,
            UserSummary,
            SessionStatus,
            HealthResponse,
            HealthDetailsResponse,
            ReadyResponse,
            RoleInfo,
            RoleCatalogue,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, token refresh and logout through the identity provider"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Roles", description = "Role catalogue")
    ),
    info(
        title = "MBG API",
        version = "0.1.0",
        description = "School meal program API. Every response is wrapped in a `{success, data | error, meta}` envelope.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
