use crate::Environment;
use crate::env::{self, Lookup};

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Default filter directive. `RUST_LOG` overrides it when set.
    pub level: String,
    /// JSON console output. On by default in production.
    pub json: bool,
    /// Directory for daily rolling log files. No file output when unset.
    pub log_dir: Option<String>,
    pub metrics_enabled: bool,
}

impl LoggingConfig {
    pub fn from_env(environment: Environment) -> Self {
        Self::from_lookup(&env::process_env, environment)
    }

    pub fn from_lookup(lookup: Lookup<'_>, environment: Environment) -> Self {
        Self {
            level: env::string_or(lookup, "LOG_LEVEL", "info"),
            json: env::bool_or(lookup, "LOG_JSON", environment.is_production()),
            log_dir: env::string(lookup, "LOG_DIR"),
            metrics_enabled: env::bool_or(lookup, "METRICS_ENABLED", true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_defaults_by_environment() {
        let none = |_: &str| -> Option<String> { None };
        assert!(LoggingConfig::from_lookup(&none, Environment::Production).json);
        assert!(!LoggingConfig::from_lookup(&none, Environment::Development).json);
    }

    #[test]
    fn test_metrics_toggle() {
        let lookup = |key: &str| (key == "METRICS_ENABLED").then(|| "false".to_string());
        let config = LoggingConfig::from_lookup(&lookup, Environment::Development);
        assert!(!config.metrics_enabled);
        assert_eq!(config.level, "info");
    }
}
