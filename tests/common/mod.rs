#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use chrono::Utc;
use http_body_util::BodyExt;
use mbg::router::{ApiRoutes, init_router};
use mbg::state::AppState;
use mbg_auth::{IdentityClaims, Role, encode_claims, issue_token};
use mbg_config::{AppConfig, JwtConfig};
use mbg_db::init_lazy_pool;
use serde_json::Value;
use tracing_subscriber::fmt::MakeWriter;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Nothing listens on port 1, so database calls fail fast instead of hanging.
const UNREACHABLE_DATABASE: &str = "postgres://postgres@127.0.0.1:1/mbg_test";

pub fn test_config(overrides: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = [
        ("ENVIRONMENT", "test"),
        ("JWT_SECRET", TEST_SECRET),
        ("DATABASE_URL", UNREACHABLE_DATABASE),
        ("DB_MIN_CONNECTIONS", "0"),
        ("DB_ACQUIRE_TIMEOUT", "1s"),
        ("METRICS_ENABLED", "false"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    AppConfig::from_lookup(&move |key: &str| vars.get(key).cloned()).unwrap()
}

/// Must be called inside a tokio runtime: the lazy pool spawns its reaper task.
pub fn test_state(overrides: &[(&str, &str)]) -> AppState {
    let config = test_config(overrides);
    let pool = init_lazy_pool(&config.database).unwrap();
    AppState::new(config, pool).unwrap()
}

pub fn test_app(overrides: &[(&str, &str)], routes: ApiRoutes) -> Router {
    init_router(test_state(overrides), routes)
}

pub fn default_app() -> Router {
    test_app(&[], ApiRoutes::new())
}

pub fn jwt_config(secret: &str) -> JwtConfig {
    JwtConfig {
        secret: secret.to_string(),
        leeway_secs: 0,
        audience: None,
        access_token_expiry: 3600,
    }
}

pub fn token_for(role: Role) -> String {
    token_with_secret(role, TEST_SECRET)
}

pub fn token_with_secret(role: Role, secret: &str) -> String {
    let user_id = format!("{}-user", role.as_str());
    let email = format!("{}@mbg.test", role.as_str());
    issue_token(&user_id, &email, role, 3600, &jwt_config(secret)).unwrap()
}

pub fn expired_token(role: Role) -> String {
    let now = Utc::now().timestamp();
    let claims = IdentityClaims {
        sub: "expired-user".to_string(),
        email: "expired@mbg.test".to_string(),
        role,
        exp: now - 600,
        iat: now - 4200,
        nbf: None,
    };
    encode_claims(&claims, &jwt_config(TEST_SECRET)).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// In-memory log sink for asserting on emitted log lines.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_owned)
            .collect()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Routes log output of the current thread into a [`LogCapture`] until the
/// guard is dropped. `#[tokio::test]` runs on one thread, so this sees every
/// line the request produces.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}
