//! Assigns the request's trace id and creates its [`RequestContext`].

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::context::{RequestContext, TraceSlot};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const MAX_TRACE_ID_LEN: usize = 128;

/// Inbound ids are reused only when they are short, visible ASCII.
pub fn is_valid_trace_id(id: &str) -> bool {
    (1..=MAX_TRACE_ID_LEN).contains(&id.len()) && id.bytes().all(|b| (0x21..=0x7e).contains(&b))
}

pub async fn assign_trace_id(mut req: Request, next: Next) -> Response {
    let trace_id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|id| is_valid_trace_id(id))
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Some(slot) = req.extensions().get::<TraceSlot>() {
        slot.set(&trace_id);
    }
    req.extensions_mut().insert(RequestContext::new(trace_id.clone()));

    let header = HeaderValue::from_str(&trace_id).ok();
    if let Some(value) = &header {
        req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    }

    let span = info_span!("request", trace_id = %trace_id);
    let mut response = next.run(req).instrument(span).await;

    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_trace_ids() {
        assert!(is_valid_trace_id("abc-123"));
        assert!(is_valid_trace_id(&"x".repeat(128)));
    }

    #[test]
    fn test_invalid_trace_ids() {
        assert!(!is_valid_trace_id(""));
        assert!(!is_valid_trace_id(&"x".repeat(129)));
        assert!(!is_valid_trace_id("has space"));
        assert!(!is_valid_trace_id("tab\there"));
        assert!(!is_valid_trace_id("caf\u{e9}"));
    }
}
