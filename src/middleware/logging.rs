use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::HttpBody,
    extract::{ConnectInfo, MatchedPath, Request},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use mbg_core::ErrorReport;
use mbg_observability::{record_http_request, track_request_started};
use tracing::{error, info, warn};

use crate::context::RequestContext;

/// Client address: proxy headers first, then the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(str::to_owned)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().unwrap_or_default().to_string();
    // Metrics use the route template so ids do not explode label cardinality.
    let metric_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| path.clone());
    let trace_id = req
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.trace_id().to_string())
        .unwrap_or_default();
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    info!(
        trace_id = %trace_id,
        method = %method,
        path = %path,
        query = %query,
        client_ip = %client_ip(req.headers(), peer),
        user_agent = %user_agent,
        "HTTP request started"
    );

    let in_flight = track_request_started();
    let response = next.run(req).await;
    drop(in_flight);

    let latency = start.elapsed();
    let status = response.status();
    let size = response.body().size_hint().exact().unwrap_or_default();

    if let Some(report) = response.extensions().get::<ErrorReport>() {
        let source = report.source.as_deref().unwrap_or_default();
        if status.is_server_error() {
            error!(trace_id = %trace_id, code = %report.code, message = %report.message, source, "Request error");
        } else {
            warn!(trace_id = %trace_id, code = %report.code, message = %report.message, source, "Request error");
        }
    }

    let latency_ms = latency.as_millis() as u64;
    if status.is_server_error() {
        error!(trace_id = %trace_id, method = %method, path = %path, status = status.as_u16(), size, latency_ms, "HTTP request completed");
    } else if status.is_client_error() {
        warn!(trace_id = %trace_id, method = %method, path = %path, status = status.as_u16(), size, latency_ms, "HTTP request completed");
    } else {
        info!(trace_id = %trace_id, method = %method, path = %path, status = status.as_u16(), size, latency_ms, "HTTP request completed");
    }

    record_http_request(method.as_str(), &metric_path, status.as_u16(), latency);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers, None), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers, None), "198.51.100.2");

        let peer: SocketAddr = "192.0.2.1:5555".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)), "192.0.2.1");
        assert_eq!(client_ip(&HeaderMap::new(), None), "unknown");
    }
}
