//! Renders deferred envelope payloads once the trace id is known, and turns
//! framework rejections (plain-text 4xx/5xx bodies) into error envelopes.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{Method, StatusCode, header},
    middleware::Next,
    response::Response,
};
use mbg_core::{
    Envelope, EnvelopePayload, ErrorBody, ErrorCode, ErrorReport, GENERIC_INTERNAL_MESSAGE, Meta,
};

use crate::context::RequestContext;

const REJECTION_BODY_LIMIT: usize = 16 * 1024;

pub async fn finalize_envelope(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let trace_id = req
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.trace_id().to_string())
        .unwrap_or_default();

    let mut response = next.run(req).await;
    let meta = Meta::new(trace_id, method.as_str(), path.as_str());

    if let Some(payload) = response.extensions_mut().remove::<EnvelopePayload>() {
        return render(response, payload, meta);
    }

    if is_rejection(&response) {
        return rewrite_rejection(response, &method, &path, meta).await;
    }

    response
}

/// Replaces the body with the rendered envelope, keeping status, headers and
/// extensions set further in.
fn render(response: Response, payload: EnvelopePayload, meta: Meta) -> Response {
    let (mut parts, _) = response.into_parts();
    let rendered = Envelope::from_payload(payload, meta).render(parts.status);
    let (rendered_parts, body) = rendered.into_parts();

    parts.headers.remove(header::CONTENT_LENGTH);
    for (name, value) in &rendered_parts.headers {
        parts.headers.insert(name.clone(), value.clone());
    }
    Response::from_parts(parts, body)
}

fn is_rejection(response: &Response) -> bool {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return false;
    }
    match response.headers().get(header::CONTENT_TYPE) {
        None => true,
        Some(value) => value
            .to_str()
            .map(|v| v.starts_with("text/plain"))
            .unwrap_or(false),
    }
}

async fn rewrite_rejection(response: Response, method: &Method, path: &str, meta: Meta) -> Response {
    let (mut parts, body) = response.into_parts();
    let text = to_bytes(body, REJECTION_BODY_LIMIT)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();

    let error = if parts.status == StatusCode::METHOD_NOT_ALLOWED {
        parts.status = StatusCode::NOT_FOUND;
        ErrorBody {
            code: ErrorCode::NotFound,
            message: format!("Route {method} {path} not found"),
            details: None,
        }
    } else if parts.status.is_server_error() {
        ErrorBody {
            code: ErrorCode::from_status(parts.status),
            message: GENERIC_INTERNAL_MESSAGE.to_string(),
            details: None,
        }
    } else {
        ErrorBody {
            code: ErrorCode::from_status(parts.status),
            message: "Invalid request format".to_string(),
            details: (!text.is_empty()).then(|| text.clone()),
        }
    };

    parts.extensions.insert(ErrorReport {
        code: error.code,
        message: error.message.clone(),
        source: (!text.is_empty()).then_some(text),
    });
    parts.headers.remove(header::ALLOW);
    render(
        Response::from_parts(parts, Body::empty()),
        EnvelopePayload::Error(error),
        meta,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use mbg_core::{ApiResponse, AppError};
    use serde_json::{Value, json};

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn meta() -> Meta {
        Meta::new("trace-9", "POST", "/api/v1/auth/login")
    }

    #[tokio::test]
    async fn test_render_keeps_headers_and_extensions() {
        let mut response = AppError::conflict("Email already exists").into_response();
        response
            .headers_mut()
            .insert("x-request-id", "trace-9".parse().unwrap());
        let payload = response.extensions_mut().remove::<EnvelopePayload>().unwrap();

        let rendered = render(response, payload, meta());
        assert_eq!(rendered.status(), StatusCode::CONFLICT);
        assert_eq!(rendered.headers()["x-request-id"], "trace-9");
        assert_eq!(rendered.headers()[header::CONTENT_TYPE], "application/json");
        assert!(rendered.extensions().get::<ErrorReport>().is_some());

        let value = body_json(rendered).await;
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "CONFLICT");
        assert_eq!(value["meta"]["trace_id"], "trace-9");
    }

    #[tokio::test]
    async fn test_rejection_becomes_bad_request_envelope() {
        let response = (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Failed to deserialize the JSON body",
        )
            .into_response();
        assert!(is_rejection(&response));

        let rewritten = rewrite_rejection(response, &Method::POST, "/api/v1/auth/login", meta()).await;
        assert_eq!(rewritten.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let value = body_json(rewritten).await;
        assert_eq!(value["error"]["code"], "BAD_REQUEST");
        assert_eq!(value["error"]["message"], "Invalid request format");
        assert_eq!(value["error"]["details"], "Failed to deserialize the JSON body");
    }

    #[tokio::test]
    async fn test_method_not_allowed_becomes_not_found() {
        let response = StatusCode::METHOD_NOT_ALLOWED.into_response();
        let rewritten = rewrite_rejection(response, &Method::DELETE, "/health", meta()).await;
        assert_eq!(rewritten.status(), StatusCode::NOT_FOUND);
        let value = body_json(rewritten).await;
        assert_eq!(value["error"]["message"], "Route DELETE /health not found");
    }

    #[test]
    fn test_success_and_json_errors_are_not_rejections() {
        assert!(!is_rejection(&ApiResponse::<()>::no_content().into_response()));
        let json_error = (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({"error": "already rendered"})),
        )
            .into_response();
        assert!(!is_rejection(&json_error));
    }
}
