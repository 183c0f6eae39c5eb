use std::time::Duration;

use anyhow::anyhow;
use axum::extract::State;
use chrono::Utc;
use mbg_core::{ApiResponse, AppError};
use mbg_db::{ping, pool_health};
use tracing::error;

use crate::context::{AuthUser, RequestContext};
use crate::state::AppState;

use super::model::{HealthDetailsResponse, HealthResponse, ReadyResponse};

const READY_TIMEOUT: Duration = Duration::from_secs(5);

fn snapshot(state: &AppState) -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().timestamp(),
        environment: state.config.environment.as_str().to_string(),
        database: pool_health(&state.db),
    }
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    ApiResponse::ok(snapshot(&state))
}

/// Readiness probe: succeeds once the database answers
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Dependencies reachable", body = ReadyResponse),
        (status = 500, description = "Service not ready")
    ),
    tag = "Health"
)]
pub async fn ready(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<ApiResponse<ReadyResponse>, AppError> {
    let outcome = match tokio::time::timeout(READY_TIMEOUT, ping(&state.db)).await {
        Ok(result) => result.map_err(anyhow::Error::from),
        Err(_) => Err(anyhow!("database ping timed out after {READY_TIMEOUT:?}")),
    };

    if let Err(err) = outcome {
        error!(trace_id = %ctx.trace_id(), error = %err, "Readiness check failed");
        return Err(AppError::internal_error("Service not ready").with_source(err));
    }

    Ok(ApiResponse::ok(ReadyResponse {
        status: "ready".to_string(),
        timestamp: Utc::now().timestamp(),
    }))
}

/// Health plus the identity behind the caller's token
#[utoipa::path(
    get,
    path = "/api/v1/health/details",
    responses(
        (status = 200, description = "Service is up", body = HealthDetailsResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Health",
    security(("bearer_auth" = []))
)]
pub async fn health_details(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResponse<HealthDetailsResponse> {
    ApiResponse::ok(HealthDetailsResponse {
        health: snapshot(&state),
        user: user.0,
    })
}
