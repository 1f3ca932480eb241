//! Connection manager for the MySQL pool.
//!
//! [`ConnectionManager`] is created once at startup and shared through the
//! axum state as an `Arc`. It owns the pool and tracks whether the database
//! is usable. A failed or unconfigured startup leaves it `Unavailable`
//! instead of aborting, so the HTTP listener can still come up.
//!
//! Connections handed out by [`ConnectionManager::acquire`] go back to the
//! pool when dropped, which covers early returns, errors, and cancelled
//! requests alike.

use std::future::Future;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::MySql;
use tokio::sync::RwLock;

use crate::config::DatabaseConfig;
use crate::{DbError, DbPool};

/// A pooled connection; dropping it releases it back to the pool.
pub type PooledConnection = PoolConnection<MySql>;

/// Lifecycle of the managed pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// `initialize` has not run yet.
    Uninitialized,
    /// Pool established and the liveness probe passed.
    Ready,
    /// Configuration absent or the connection attempt failed.
    Unavailable,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::Ready => "ready",
            ConnectionState::Unavailable => "unavailable",
        }
    }
}

struct Inner {
    state: ConnectionState,
    pool: Option<DbPool>,
}

/// Owns the connection pool and its availability state.
pub struct ConnectionManager {
    config: Option<DatabaseConfig>,
    query_timeout: Option<Duration>,
    inner: RwLock<Inner>,
}

impl ConnectionManager {
    /// Create an uninitialized manager. `None` means no database is configured.
    pub fn new(config: Option<DatabaseConfig>) -> Self {
        let query_timeout = config.as_ref().and_then(|c| c.query_timeout);
        Self {
            config,
            query_timeout,
            inner: RwLock::new(Inner {
                state: ConnectionState::Uninitialized,
                pool: None,
            }),
        }
    }

    /// Wrap an already-connected pool. The manager starts out `Ready`.
    pub fn from_pool(pool: DbPool, query_timeout: Option<Duration>) -> Self {
        Self {
            config: None,
            query_timeout,
            inner: RwLock::new(Inner {
                state: ConnectionState::Ready,
                pool: Some(pool),
            }),
        }
    }

    /// A manager with no database behind it.
    pub fn unavailable() -> Self {
        Self {
            config: None,
            query_timeout: None,
            inner: RwLock::new(Inner {
                state: ConnectionState::Unavailable,
                pool: None,
            }),
        }
    }

    pub fn config(&self) -> Option<&DatabaseConfig> {
        self.config.as_ref()
    }

    /// Establish the pool and run the liveness probe.
    ///
    /// Never fails: any problem is logged and leaves the manager
    /// `Unavailable`. Calling it again on an `Unavailable` manager retries.
    pub async fn initialize(&self) -> ConnectionState {
        let Some(config) = &self.config else {
            tracing::warn!("No database configuration found; running without a database");
            self.set(ConnectionState::Unavailable, None).await;
            return ConnectionState::Unavailable;
        };

        tracing::info!(
            target_db = %config.target.describe(),
            max_connections = config.max_connections,
            acquire_timeout_secs = config.acquire_timeout.as_secs(),
            "Connecting to database"
        );

        match connect(config).await {
            Ok((pool, solution)) => {
                tracing::info!(solution, "Database connection established");
                self.set(ConnectionState::Ready, Some(pool)).await;
                ConnectionState::Ready
            }
            Err(e) => {
                tracing::error!(error = %e, "Database connection failed");
                self.set(ConnectionState::Unavailable, None).await;
                ConnectionState::Unavailable
            }
        }
    }

    pub async fn state(&self) -> ConnectionState {
        self.inner.read().await.state
    }

    /// Fail fast with [`DbError::Unavailable`] unless the manager is `Ready`.
    ///
    /// Purely in-memory; does not touch the backend.
    pub async fn ensure_ready(&self) -> Result<(), DbError> {
        match self.state().await {
            ConnectionState::Ready => Ok(()),
            state => Err(DbError::Unavailable(format!(
                "database connection is {}",
                state.as_str()
            ))),
        }
    }

    /// Take a connection from the pool, waiting up to the acquire timeout.
    ///
    /// Any failure to obtain a connection, including a refused connect while
    /// the pool refills, is reported as [`DbError::Unavailable`].
    pub async fn acquire(&self) -> Result<PooledConnection, DbError> {
        let pool = self.pool().await?;
        pool.acquire().await.map_err(|e| match DbError::from(e) {
            DbError::Sqlx(e) => DbError::Unavailable(format!("could not open a connection: {e}")),
            other => other,
        })
    }

    /// Run one backend round-trip under the configured query timeout.
    pub async fn bounded<F, T>(&self, query: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, query)
                .await
                .map_err(|_| DbError::QueryTimeout(limit))?
                .map_err(DbError::from),
            None => query.await.map_err(DbError::from),
        }
    }

    /// Run the liveness probe against the current pool.
    pub async fn health_check(&self) -> Result<i64, DbError> {
        let pool = self.pool().await?;
        self.bounded(crate::health_check(&pool)).await
    }

    /// Close the pool and mark the manager `Unavailable`.
    pub async fn close(&self) {
        let pool = {
            let mut inner = self.inner.write().await;
            inner.state = ConnectionState::Unavailable;
            inner.pool.take()
        };
        if let Some(pool) = pool {
            pool.close().await;
            tracing::info!("Database pool closed");
        }
    }

    async fn pool(&self) -> Result<DbPool, DbError> {
        let inner = self.inner.read().await;
        match (inner.state, &inner.pool) {
            (ConnectionState::Ready, Some(pool)) => Ok(pool.clone()),
            (state, _) => Err(DbError::Unavailable(format!(
                "database connection is {}",
                state.as_str()
            ))),
        }
    }

    async fn set(&self, state: ConnectionState, pool: Option<DbPool>) {
        let previous = {
            let mut inner = self.inner.write().await;
            inner.state = state;
            std::mem::replace(&mut inner.pool, pool)
        };
        if let Some(previous) = previous {
            previous.close().await;
        }
    }
}

async fn connect(config: &DatabaseConfig) -> Result<(DbPool, i64), sqlx::Error> {
    let pool = crate::create_pool(config).await?;
    match crate::health_check(&pool).await {
        Ok(solution) => Ok((pool, solution)),
        Err(e) => {
            pool.close().await;
            Err(e)
        }
    }
}
