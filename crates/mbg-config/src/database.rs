use std::time::Duration;

use crate::env::{self, Lookup};

/// Postgres connection settings.
///
/// `DATABASE_URL` wins when set; otherwise the URL is assembled from the
/// `DB_*` parts.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env::process_env)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let url = env::string(lookup, "DATABASE_URL").unwrap_or_else(|| {
            let user = env::string_or(lookup, "DB_USER", "postgres");
            let password = env::string_or(lookup, "DB_PASSWORD", "");
            let host = env::string_or(lookup, "DB_HOST", "localhost");
            let port: u16 = env::parse_or(lookup, "DB_PORT", 5432);
            let name = env::string_or(lookup, "DB_NAME", "mbg");
            let ssl_mode = env::string_or(lookup, "DB_SSL_MODE", "disable");

            format!("postgresql://{user}:{password}@{host}:{port}/{name}?sslmode={ssl_mode}")
        });

        Self {
            url,
            max_connections: env::parse_or(lookup, "DB_MAX_CONNECTIONS", 25),
            min_connections: env::parse_or(lookup, "DB_MIN_CONNECTIONS", 5),
            max_lifetime: env::duration_or(lookup, "DB_CONN_MAX_LIFETIME", Duration::from_secs(300)),
            idle_timeout: env::duration_or(lookup, "DB_CONN_MAX_IDLE_TIME", Duration::from_secs(120)),
            acquire_timeout: env::duration_or(lookup, "DB_ACQUIRE_TIMEOUT", Duration::from_secs(5)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(vars: &[(&str, &str)]) -> DatabaseConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DatabaseConfig::from_lookup(&move |key: &str| map.get(key).cloned())
    }

    #[test]
    fn test_url_from_parts() {
        let config = from(&[
            ("DB_HOST", "db.internal"),
            ("DB_USER", "mbg"),
            ("DB_PASSWORD", "pw"),
            ("DB_NAME", "meals"),
        ]);
        assert_eq!(
            config.url,
            "postgresql://mbg:pw@db.internal:5432/meals?sslmode=disable"
        );
    }

    #[test]
    fn test_database_url_takes_precedence() {
        let config = from(&[
            ("DATABASE_URL", "postgres://u@h/d"),
            ("DB_HOST", "ignored"),
        ]);
        assert_eq!(config.url, "postgres://u@h/d");
    }

    #[test]
    fn test_pool_defaults() {
        let config = from(&[]);
        assert_eq!(config.max_connections, 25);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.max_lifetime, Duration::from_secs(300));
        assert_eq!(config.idle_timeout, Duration::from_secs(120));
    }
}
