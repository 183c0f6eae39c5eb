//! Uniform response envelope.
//!
//! Every response the API produces (success or failure) has the shape
//!
//! ```text
//! { "success": bool, "data"?: any, "error"?: {code, message, details?}, "meta": {trace_id, ...} }
//! ```
//!
//! `data` and `error` are mutually exclusive. `meta.trace_id` is filled from the
//! request context, which is why handlers return an [`ApiResponse`] or an
//! [`AppError`](crate::AppError) instead of a finished body: both leave an
//! [`EnvelopePayload`] in the response extensions and the pipeline renders it with
//! [`Envelope::from_payload`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorCode};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Meta {
    pub trace_id: String,
    /// Unix timestamp (seconds) at which the response was rendered
    pub timestamp: i64,
    pub path: String,
    pub method: String,
}

impl Meta {
    pub fn new(trace_id: impl Into<String>, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            timestamp: Utc::now().timestamp(),
            path: path.into(),
            method: method.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub meta: Meta,
}

impl Envelope {
    pub fn success(data: Value, meta: Meta) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta,
        }
    }

    pub fn failure(error: ErrorBody, meta: Meta) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            meta,
        }
    }

    pub fn from_payload(payload: EnvelopePayload, meta: Meta) -> Self {
        match payload {
            EnvelopePayload::Data(data) => Self::success(data, meta),
            EnvelopePayload::Error(error) => Self::failure(error, meta),
        }
    }

    /// Serialises the envelope as the response body with the given status.
    pub fn render(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Deferred envelope content, carried in response extensions until the pipeline
/// knows the request's trace id.
#[derive(Debug, Clone)]
pub enum EnvelopePayload {
    Data(Value),
    Error(ErrorBody),
}

/// Successful handler result.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    status: StatusCode,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 200 OK
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            data: Some(data),
        }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            data: Some(data),
        }
    }

    /// 204 No Content. No envelope is rendered because the status forbids a body.
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            data: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let Some(data) = self.data else {
            return self.status.into_response();
        };

        match serde_json::to_value(&data) {
            Ok(value) => {
                let mut response = self.status.into_response();
                response
                    .extensions_mut()
                    .insert(EnvelopePayload::Data(value));
                response
            }
            Err(err) => AppError::internal(err).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    fn meta() -> Meta {
        Meta::new("trace-1", "GET", "/health")
    }

    #[test]
    fn test_success_envelope_has_no_error() {
        let value = serde_json::to_value(Envelope::success(json!({"ok": true}), meta())).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["ok"], true);
        assert!(value.get("error").is_none());
        assert_eq!(value["meta"]["trace_id"], "trace-1");
    }

    #[test]
    fn test_failure_envelope_has_no_data() {
        let error = ErrorBody {
            code: ErrorCode::NotFound,
            message: "School not found".to_string(),
            details: None,
        };
        let value = serde_json::to_value(Envelope::failure(error, meta())).unwrap();
        assert_eq!(value["success"], false);
        assert!(value.get("data").is_none());
        assert_eq!(value["error"]["code"], "NOT_FOUND");
        assert!(value["error"].get("details").is_none());
    }

    #[test]
    fn test_api_response_defers_payload() {
        let response = ApiResponse::created(json!({"id": 7})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        match response.extensions().get::<EnvelopePayload>() {
            Some(EnvelopePayload::Data(value)) => assert_eq!(value["id"], 7),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_no_content_has_no_payload() {
        let response = ApiResponse::<()>::no_content().into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.extensions().get::<EnvelopePayload>().is_none());
    }

    #[tokio::test]
    async fn test_render_writes_json_body() {
        let response = Envelope::success(json!([1, 2]), meta()).render(StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["data"], json!([1, 2]));
        assert_eq!(value["meta"]["method"], "GET");
    }
}
