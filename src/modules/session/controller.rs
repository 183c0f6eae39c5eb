use chrono::Utc;
use mbg_core::{ApiResponse, AppError};

use crate::context::AuthUser;

use super::model::SessionStatus;

/// Confirm the bearer token is accepted and show who it belongs to
#[utoipa::path(
    get,
    path = "/api/v1/auth/health",
    responses(
        (status = 200, description = "Token accepted", body = SessionStatus),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
pub async fn session_status(user: AuthUser) -> Result<ApiResponse<SessionStatus>, AppError> {
    Ok(ApiResponse::ok(SessionStatus {
        status: "authenticated".to_string(),
        user_id: user.user_id().to_string(),
        user_role: user.role(),
        email: user.email().to_string(),
        timestamp: Utc::now().timestamp(),
    }))
}
