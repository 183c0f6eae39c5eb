use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{health, health_details, ready};

pub fn init_health_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}

/// Mounted under `/api/v1/health` behind the auth stage.
pub fn init_health_details_router() -> Router<AppState> {
    Router::new().route("/details", get(health_details))
}
