use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mbg_core::AppError;
use tracing::warn;

use crate::context::RequestContext;
use crate::state::AppState;

pub const REQUEST_TIMEOUT_HEADER: HeaderName = HeaderName::from_static("x-request-timeout");

/// `15s` renders as `15`, `250ms` as `0.25`.
fn header_value(timeout: Duration) -> Option<HeaderValue> {
    HeaderValue::from_str(&timeout.as_secs_f64().to_string()).ok()
}

/// Bounds the rest of the pipeline by `SERVER_REQUEST_TIMEOUT`. On expiry the
/// inner future is dropped and the client gets a 504.
pub async fn enforce_timeout(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let timeout = state.config.server.request_timeout;
    let header = header_value(timeout);

    if let Some(value) = &header {
        req.headers_mut().insert(REQUEST_TIMEOUT_HEADER, value.clone());
    }
    let trace_id = match req.extensions_mut().get_mut::<RequestContext>() {
        Some(ctx) => {
            ctx.set_timeout(timeout);
            ctx.trace_id().to_string()
        }
        None => String::new(),
    };
    let path = req.uri().path().to_string();

    let mut response = match tokio::time::timeout(timeout, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(trace_id = %trace_id, path = %path, timeout_ms = timeout.as_millis() as u64, "Request timed out");
            AppError::gateway_timeout("Request timed out").into_response()
        }
    };

    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_TIMEOUT_HEADER, value);
    }
    response
}
