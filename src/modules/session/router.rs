use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::session_status;

pub fn init_session_router() -> Router<AppState> {
    Router::new().route("/health", get(session_status))
}
