use axum::extract::State;
use axum::http::HeaderMap;
use mbg_core::{ApiResponse, AppError};
use tracing::{info, instrument};

use crate::context::{AuthUser, RequestContext};
use crate::middleware::auth::bearer_token;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshTokenRequest, RefreshTokenResponse,
};
use super::service::AuthService;

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Bad request - validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    info!(trace_id = %ctx.trace_id(), email = %dto.email, "User login attempt");

    let response = AuthService::login(
        state.identity_provider.as_deref(),
        state.config.dev_auth.as_ref(),
        &state.config.jwt,
        dto,
    )
    .await?;

    info!(trace_id = %ctx.trace_id(), user_id = %response.user.id, "User logged in");
    Ok(ApiResponse::ok(response))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed", body = RefreshTokenResponse),
        (status = 400, description = "Bad request - validation error"),
        (status = 401, description = "Refresh token rejected")
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(dto): ValidatedJson<RefreshTokenRequest>,
) -> Result<ApiResponse<RefreshTokenResponse>, AppError> {
    info!(trace_id = %ctx.trace_id(), "Token refresh attempt");
    let response = AuthService::refresh(state.identity_provider.as_deref(), dto).await?;
    Ok(ApiResponse::ok(response))
}

/// Revoke the caller's provider session
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Provider sign-out failed")
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    ctx: RequestContext,
    user: AuthUser,
    headers: HeaderMap,
) -> Result<ApiResponse<LogoutResponse>, AppError> {
    info!(trace_id = %ctx.trace_id(), user_id = %user.user_id(), "User logout");

    // The auth stage already accepted this header.
    let token = bearer_token(&headers)
        .map_err(|_| AppError::unauthorized("Invalid authorization header format"))?;

    let response = AuthService::logout(state.identity_provider.as_deref(), token).await?;
    Ok(ApiResponse::ok(response))
}
