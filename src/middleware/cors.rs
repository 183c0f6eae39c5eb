use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mbg_config::CorsConfig;

use crate::state::AppState;

const ALLOW_METHODS: &str = "POST, OPTIONS, GET, PUT, DELETE, PATCH";
const ALLOW_HEADERS: &str = "Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, Authorization, accept, origin, Cache-Control, X-Requested-With, X-Request-ID";
const EXPOSE_HEADERS: &str = "X-Request-ID, X-Request-Timeout";

/// Adds CORS headers to every response. Preflight requests end here with an
/// empty 204 and never reach authentication.
pub async fn cors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    apply_cors_headers(&state.config.cors, origin.as_deref(), response.headers_mut());
    response
}

pub fn apply_cors_headers(config: &CorsConfig, origin: Option<&str>, headers: &mut HeaderMap) {
    if config.allows_any_origin() {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    } else {
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
        let allowed = origin
            .filter(|origin| config.allows_origin(origin))
            .and_then(|origin| HeaderValue::from_str(origin).ok());
        if let Some(origin) = allowed {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
    }

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSE_HEADERS),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(origins: &[&str]) -> CorsConfig {
        CorsConfig {
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[test]
    fn test_wildcard_origin() {
        let mut headers = HeaderMap::new();
        apply_cors_headers(&config(&["*"]), Some("https://app.mbg.id"), &mut headers);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
    }

    #[test]
    fn test_listed_origin_is_echoed() {
        let mut headers = HeaderMap::new();
        apply_cors_headers(
            &config(&["https://app.mbg.id"]),
            Some("https://app.mbg.id"),
            &mut headers,
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.mbg.id");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::VARY], "Origin");
    }

    #[test]
    fn test_unlisted_origin_gets_no_allow_origin() {
        let mut headers = HeaderMap::new();
        apply_cors_headers(
            &config(&["https://app.mbg.id"]),
            Some("https://evil.example"),
            &mut headers,
        );
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).is_some());
    }
}
