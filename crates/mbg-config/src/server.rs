use std::time::Duration;

use crate::env::{self, Lookup};

/// HTTP server settings.
///
/// `request_timeout` is the per-request deadline enforced by the pipeline; it
/// defaults to the read timeout.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub idle_timeout: Duration,
    pub request_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            read_timeout: Duration::from_secs(15),
            write_timeout: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(15),
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env::process_env)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let defaults = Self::default();
        let read_timeout = env::duration_or(lookup, "SERVER_READ_TIMEOUT", defaults.read_timeout);

        Self {
            host: env::string_or(lookup, "SERVER_HOST", &defaults.host),
            port: env::parse_or(lookup, "SERVER_PORT", defaults.port),
            read_timeout,
            write_timeout: env::duration_or(lookup, "SERVER_WRITE_TIMEOUT", defaults.write_timeout),
            idle_timeout: env::duration_or(lookup, "SERVER_IDLE_TIMEOUT", defaults.idle_timeout),
            request_timeout: env::duration_or(lookup, "SERVER_REQUEST_TIMEOUT", read_timeout),
            shutdown_grace: env::duration_or(lookup, "SERVER_SHUTDOWN_GRACE", defaults.shutdown_grace),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
