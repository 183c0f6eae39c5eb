use axum::extract::State;
use mbg_core::ApiResponse;
use tracing::debug;

use crate::context::AuthUser;
use crate::state::AppState;

use super::model::RoleCatalogue;
use super::service;

/// List the roles and the route groups each one may access
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    responses(
        (status = 200, description = "Role catalogue", body = RoleCatalogue),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn list_roles(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResponse<RoleCatalogue> {
    debug!(user_id = %user.user_id(), "Listing role catalogue");
    ApiResponse::ok(service::role_catalogue(&state.policy))
}
