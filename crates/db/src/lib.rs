//! Database layer: configuration, connection management, models, and
//! repositories for the `projects` table.

use std::time::Duration;

use sqlx::mysql::MySqlPoolOptions;

pub mod config;
pub mod manager;
pub mod models;
pub mod reconnect;
pub mod repositories;

pub use config::DatabaseConfig;
pub use manager::{ConnectionManager, ConnectionState};

pub type DbPool = sqlx::MySqlPool;

/// Errors surfaced by the database layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// No usable connection: the manager is not ready, the pool is closed,
    /// or the wait for a free connection timed out.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Query did not complete within {0:?}")]
    QueryTimeout(Duration),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                DbError::Unavailable("timed out waiting for a pooled connection".to_string())
            }
            sqlx::Error::PoolClosed => {
                DbError::Unavailable("connection pool is closed".to_string())
            }
            other => DbError::Sqlx(other),
        }
    }
}

/// Create a connection pool and open its first connection.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let options = config.target.connect_options()?;
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
}

/// Liveness probe: a trivial arithmetic round-trip. Returns the computed value.
pub async fn health_check(pool: &DbPool) -> Result<i64, sqlx::Error> {
    let (solution,): (i64,) = sqlx::query_as("SELECT 1 + 1 AS solution")
        .fetch_one(pool)
        .await?;
    Ok(solution)
}
