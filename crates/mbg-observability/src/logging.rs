use std::fs;

use mbg_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::ObservabilityError;

/// Filter used when `RUST_LOG` is unset: `level` for everything, dependencies
/// that log per connection held at `warn`.
fn default_filter(level: &str) -> String {
    format!("{level},tower_http=warn,hyper=warn,h2=warn,sqlx=warn,reqwest=warn")
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)))
}

/// Installs the global `tracing` subscriber.
///
/// Console output is compact in development and JSON when `config.json` is set.
/// With `LOG_DIR` set, JSON lines are also written to a daily rolling file through
/// a non-blocking writer; the returned guard flushes it and must be held until
/// shutdown.
pub fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>, ObservabilityError> {
    let console_layer = if config.json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_filter(env_filter(&config.level))
            .boxed()
    } else {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_filter(env_filter(&config.level))
            .boxed()
    };

    let mut guard = None;
    let file_layer = match &config.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(|source| ObservabilityError::LogDir {
                path: dir.clone(),
                source,
            })?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "mbg.json");
            let (writer, file_guard) = tracing_appender::non_blocking(appender);
            guard = Some(file_guard);

            Some(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_current_span(true)
                    .with_filter(env_filter(&config.level)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ObservabilityError::Subscriber(e.to_string()))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_dependencies() {
        let filter = default_filter("debug");
        assert!(filter.starts_with("debug,"));
        assert!(filter.contains("sqlx=warn"));
        assert!(filter.parse::<EnvFilter>().is_ok());
    }
}
