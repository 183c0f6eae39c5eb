use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{login, logout, refresh_token};

/// Routes reachable without a token.
pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
}

/// Routes that need the caller's token.
pub fn init_session_auth_router() -> Router<AppState> {
    Router::new().route("/logout", post(logout))
}
