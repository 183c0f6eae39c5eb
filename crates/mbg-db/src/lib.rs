//! # MBG DB
//!
//! Postgres connection pool for the MBG API.
//!
//! The pool is bounded by `max_connections` and evicts idle and long-lived
//! connections, so one process never holds more than the configured number of
//! database connections. Health and readiness handlers use [`ping`] and
//! [`pool_health`].
//!
//! # Example
//!
//! ```ignore
//! use mbg_config::DatabaseConfig;
//! use mbg_db::init_db_pool;
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! mbg_db::ping(&pool).await?;
//! ```

use mbg_config::DatabaseConfig;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use utoipa::ToSchema;

pub use sqlx::PgPool;

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .max_lifetime(config.max_lifetime)
        .idle_timeout(config.idle_timeout)
        .acquire_timeout(config.acquire_timeout)
}

/// Connects eagerly, failing if the database is unreachable.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = pool_options(config).connect(&config.url).await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool established"
    );
    Ok(pool)
}

/// Builds the pool without connecting. Connections are opened on first use.
pub fn init_lazy_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    pool_options(config).connect_lazy(&config.url)
}

pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Pool statistics reported by `/health`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PoolHealth {
    pub size: u32,
    pub idle: u32,
    pub max_connections: u32,
}

pub fn pool_health(pool: &PgPool) -> PoolHealth {
    PoolHealth {
        size: pool.size(),
        idle: u32::try_from(pool.num_idle()).unwrap_or(u32::MAX),
        max_connections: pool.options().get_max_connections(),
    }
}
