//! MBG Observability
//!
//! Logging and metrics setup for the MBG API:
//! - Structured logging via `tracing`, with compact or JSON console output and an
//!   optional daily rolling JSON file
//! - Prometheus metrics for requests, authentication failures and role denials
//!
//! # Examples
//!
//! ```no_run
//! use mbg_config::{Environment, LoggingConfig};
//! use mbg_observability::{init_metrics, init_tracing};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mbg_observability::ObservabilityError> {
//!     let config = LoggingConfig::from_env(Environment::Development);
//!     let _guard = init_tracing(&config)?;
//!     let _handle = init_metrics(&config)?;
//!     Ok(())
//! }
//! ```

pub mod logging;
pub mod metrics;

use thiserror::Error;

pub use self::logging::init_tracing;
pub use self::metrics::{
    InFlightRequest, init_metrics, record_http_request, track_auth_failure, track_request_started,
    track_role_denial,
};
pub use metrics_exporter_prometheus::PrometheusHandle;
pub use tracing_appender::non_blocking::WorkerGuard;

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("failed to create log directory {path}: {source}")]
    LogDir {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
}
