//! Prometheus metrics.
//!
//! The recorder is process-global and installed once by `main`. Without it the
//! recording helpers are no-ops, which is what tests rely on.

use std::time::Duration;

use mbg_config::LoggingConfig;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::ObservabilityError;

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Installs the Prometheus recorder and its upkeep task. Returns `None` when
/// metrics are disabled.
///
/// Must be called from inside a tokio runtime.
pub fn init_metrics(config: &LoggingConfig) -> Result<Option<PrometheusHandle>, ObservabilityError> {
    if !config.metrics_enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )
        .map_err(|e| ObservabilityError::Metrics(e.to_string()))?
        .install_recorder()
        .map_err(|e| ObservabilityError::Metrics(e.to_string()))?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

/// Counts one request in `http_requests_active` until dropped.
///
/// The decrement lives in `Drop` so a request that panics or whose future is
/// dropped on client disconnect still leaves the gauge.
#[must_use = "the request stops counting as in flight when the guard is dropped"]
#[derive(Debug)]
pub struct InFlightRequest(());

impl Drop for InFlightRequest {
    fn drop(&mut self) {
        gauge!("http_requests_active").decrement(1.0);
    }
}

pub fn track_request_started() -> InFlightRequest {
    gauge!("http_requests_active").increment(1.0);
    InFlightRequest(())
}

/// `path` should be the matched route template so label cardinality stays bounded.
pub fn record_http_request(method: &str, path: &str, status: u16, latency: Duration) {
    counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(latency.as_secs_f64());
}

pub fn track_auth_failure(reason: &'static str) {
    counter!("auth_failures_total", "reason" => reason).increment(1);
}

pub fn track_role_denial(group: &str) {
    counter!("role_denials_total", "group" => group.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbg_config::Environment;

    #[test]
    fn test_disabled_metrics_install_nothing() {
        let lookup = |key: &str| (key == "METRICS_ENABLED").then(|| "false".to_string());
        let config = LoggingConfig::from_lookup(&lookup, Environment::Test);
        assert!(init_metrics(&config).unwrap().is_none());
    }

    fn gauge_value(rendered: &str, name: &str) -> Option<f64> {
        rendered
            .lines()
            .find(|line| line.starts_with(name) && line[name.len()..].starts_with(' '))
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|value| value.parse().ok())
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let in_flight = track_request_started();
        record_http_request("GET", "/health", 200, Duration::from_millis(3));
        track_auth_failure("expired");
        track_role_denial("admin");
        drop(in_flight);
    }

    #[test]
    fn test_in_flight_gauge_released_on_panic() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let outer = track_request_started();
            assert_eq!(gauge_value(&handle.render(), "http_requests_active"), Some(1.0));

            let result = std::panic::catch_unwind(|| {
                let _in_flight = track_request_started();
                panic!("handler exploded");
            });
            assert!(result.is_err());
            assert_eq!(gauge_value(&handle.render(), "http_requests_active"), Some(1.0));

            drop(outer);
        });

        assert_eq!(gauge_value(&handle.render(), "http_requests_active"), Some(0.0));
    }
}
