//! # MBG Config
//!
//! Configuration types for the MBG API, loaded from environment variables.
//!
//! - [`server`]: listen address, timeouts and the shutdown grace period
//! - [`database`]: Postgres connection and pool sizing
//! - [`jwt`]: shared HMAC secret and validation knobs for bearer tokens
//! - [`cors`]: allowed origins
//! - [`identity`]: external identity provider and the dev-only login bypass
//! - [`logging`]: log level, output format, log directory and metrics toggle
//!
//! Every section can be built on its own with `from_env()`. [`AppConfig::load`]
//! builds all of them and rejects combinations that must not reach production.
//!
//! # Example
//!
//! ```ignore
//! use mbg_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::load()?;
//! println!("listening on {}", config.server.addr());
//! ```

pub mod cors;
pub mod database;
pub mod identity;
pub mod jwt;
pub mod logging;
pub mod server;

mod env;

use thiserror::Error;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use env::{Lookup, parse_duration};
pub use identity::{DevAuthConfig, IdentityProviderConfig};
pub use jwt::{DEFAULT_JWT_SECRET, JwtConfig};
pub use logging::LoggingConfig;
pub use server::ServerConfig;

/// Deployment environment, read from `ENVIRONMENT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET is required")]
    MissingJwtSecret,
    #[error("JWT_SECRET must be changed from the default value in production")]
    InsecureJwtSecret,
    #[error("SUPABASE_URL is required in production")]
    MissingIdentityProvider,
    #[error("DB_MAX_CONNECTIONS must be at least 1 and not below DB_MIN_CONNECTIONS")]
    InvalidPoolSize,
    #[error("SERVER_REQUEST_TIMEOUT must be greater than zero")]
    ZeroRequestTimeout,
}

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub identity_provider: IdentityProviderConfig,
    /// Present only outside production and only when both bypass variables are set.
    pub dev_auth: Option<DevAuthConfig>,
    /// Set when bypass credentials were supplied in production and ignored.
    pub dev_auth_suppressed: bool,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads every section from the process environment and validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(&env::process_env)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let environment = Environment::parse(&lookup("ENVIRONMENT").unwrap_or_default());
        let dev_auth_requested = DevAuthConfig::from_lookup(lookup).is_some();
        let dev_auth = if environment.is_production() {
            None
        } else {
            DevAuthConfig::from_lookup(lookup)
        };

        let config = Self {
            environment,
            server: ServerConfig::from_lookup(lookup),
            database: DatabaseConfig::from_lookup(lookup),
            jwt: JwtConfig::from_lookup(lookup),
            cors: CorsConfig::from_lookup(lookup),
            identity_provider: IdentityProviderConfig::from_lookup(lookup),
            dev_auth,
            dev_auth_suppressed: dev_auth_requested && environment.is_production(),
            logging: LoggingConfig::from_lookup(lookup, environment),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.database.max_connections == 0
            || self.database.max_connections < self.database.min_connections
        {
            return Err(ConfigError::InvalidPoolSize);
        }
        if self.server.request_timeout.is_zero() {
            return Err(ConfigError::ZeroRequestTimeout);
        }

        if self.environment.is_production() {
            if self.jwt.secret == DEFAULT_JWT_SECRET {
                return Err(ConfigError::InsecureJwtSecret);
            }
            if !self.identity_provider.is_configured() {
                return Err(ConfigError::MissingIdentityProvider);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(&move |key: &str| map.get(key).cloned())
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse("PROD"), Environment::Production);
        assert_eq!(Environment::parse("test"), Environment::Test);
        assert_eq!(Environment::parse(""), Environment::Development);
        assert_eq!(Environment::parse("staging"), Environment::Development);
    }

    #[test]
    fn test_defaults_load_in_development() {
        let config = load(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.jwt.secret, DEFAULT_JWT_SECRET);
        assert!(config.dev_auth.is_none());
        assert!(!config.dev_auth_suppressed);
    }

    #[test]
    fn test_production_rejects_default_secret() {
        let err = load(&[("ENVIRONMENT", "production"), ("SUPABASE_URL", "https://x.supabase.co")])
            .unwrap_err();
        assert_eq!(err, ConfigError::InsecureJwtSecret);
    }

    #[test]
    fn test_zero_request_timeout_rejected() {
        for value in ["0", "0s", "0ms"] {
            let err = load(&[("SERVER_REQUEST_TIMEOUT", value)]).unwrap_err();
            assert_eq!(err, ConfigError::ZeroRequestTimeout, "{value}");
        }
        assert!(load(&[("SERVER_REQUEST_TIMEOUT", "50ms")]).is_ok());
    }

    #[test]
    fn test_production_requires_identity_provider() {
        let err = load(&[("ENVIRONMENT", "production"), ("JWT_SECRET", "a-real-secret")])
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingIdentityProvider);
    }

    #[test]
    fn test_dev_auth_enabled_outside_production() {
        let config = load(&[
            ("SUPERADMIN_EMAIL", "root@mbg.local"),
            ("SUPERADMIN_PASSWORD", "changeme"),
        ])
        .unwrap();
        let dev = config.dev_auth.unwrap();
        assert_eq!(dev.email, "root@mbg.local");
    }

    #[test]
    fn test_dev_auth_suppressed_in_production() {
        let config = load(&[
            ("ENVIRONMENT", "production"),
            ("JWT_SECRET", "a-real-secret"),
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPERADMIN_EMAIL", "root@mbg.local"),
            ("SUPERADMIN_PASSWORD", "changeme"),
        ])
        .unwrap();
        assert!(config.dev_auth.is_none());
        assert!(config.dev_auth_suppressed);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut config = load(&[]).unwrap();
        config.jwt.secret.clear();
        assert_eq!(config.validate(), Err(ConfigError::MissingJwtSecret));
    }

    #[test]
    fn test_pool_bounds_validated() {
        let err = load(&[("DB_MAX_CONNECTIONS", "2"), ("DB_MIN_CONNECTIONS", "5")]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPoolSize);
    }
}
