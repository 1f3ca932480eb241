//! Database connection settings read from the environment.

use std::fmt;
use std::time::Duration;

use sqlx::mysql::MySqlConnectOptions;

pub const DEFAULT_MYSQL_PORT: u16 = 3306;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Stand-in for "wait forever" when `DB_ACQUIRE_TIMEOUT_SECS=0`.
pub const UNBOUNDED_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Where to connect: a single URL, or discrete parameters.
#[derive(Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    Url(String),
    Params {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
}

impl ConnectionTarget {
    pub fn connect_options(&self) -> Result<MySqlConnectOptions, sqlx::Error> {
        match self {
            ConnectionTarget::Url(url) => url.parse(),
            ConnectionTarget::Params {
                host,
                port,
                user,
                password,
                database,
            } => Ok(MySqlConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(database)),
        }
    }

    /// Credential-free description for log lines.
    pub fn describe(&self) -> String {
        match self {
            ConnectionTarget::Url(_) => "DATABASE_URL".to_string(),
            ConnectionTarget::Params {
                host,
                port,
                database,
                ..
            } => format!("{host}:{port}/{database}"),
        }
    }
}

impl fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionTarget::Url(_) => f.write_str("Url(<redacted>)"),
            ConnectionTarget::Params {
                host,
                port,
                user,
                database,
                ..
            } => f
                .debug_struct("Params")
                .field("host", host)
                .field("port", port)
                .field("user", user)
                .field("password", &"<redacted>")
                .field("database", database)
                .finish(),
        }
    }
}

/// Pool and connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub target: ConnectionTarget,
    /// Upper bound on open connections (default: `10`).
    pub max_connections: u32,
    /// How long a request may wait for a free connection (default: 10s).
    pub acquire_timeout: Duration,
    /// Per-statement bound; `None` disables it (default: 15s).
    pub query_timeout: Option<Duration>,
    /// Starting delay for background reconnection; `None` disables it.
    pub reconnect_interval: Option<Duration>,
}

impl DatabaseConfig {
    /// Settings with defaults for everything except the target.
    pub fn new(target: ConnectionTarget) -> Self {
        Self {
            target,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            query_timeout: Some(DEFAULT_QUERY_TIMEOUT),
            reconnect_interval: None,
        }
    }

    /// Load settings from the process environment.
    ///
    /// Returns `Ok(None)` when no connection target is configured; that is a
    /// valid state and the service runs without a database.
    ///
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `DATABASE_URL`               | -       |
    /// | `DB_HOST`                    | -       |
    /// | `DB_USER`                    | -       |
    /// | `DB_PASSWORD`                | empty   |
    /// | `DB_NAME`                    | -       |
    /// | `DB_PORT`                    | `3306`  |
    /// | `DB_MAX_CONNECTIONS`         | `10`    |
    /// | `DB_ACQUIRE_TIMEOUT_SECS`    | `10`    |
    /// | `DB_QUERY_TIMEOUT_SECS`      | `15`    |
    /// | `DB_RECONNECT_INTERVAL_SECS` | unset   |
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let target = if let Some(url) = get("DATABASE_URL") {
            ConnectionTarget::Url(url)
        } else {
            match (get("DB_HOST"), get("DB_USER"), get("DB_NAME")) {
                (Some(host), Some(user), Some(database)) => ConnectionTarget::Params {
                    host,
                    port: parse_or("DB_PORT", get("DB_PORT"), DEFAULT_MYSQL_PORT)?,
                    user,
                    password: lookup("DB_PASSWORD").unwrap_or_default(),
                    database,
                },
                _ => return Ok(None),
            }
        };

        let max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            get("DB_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        let acquire_timeout =
            match parse_secs("DB_ACQUIRE_TIMEOUT_SECS", get("DB_ACQUIRE_TIMEOUT_SECS"))? {
                None => DEFAULT_ACQUIRE_TIMEOUT,
                Some(0) => UNBOUNDED_ACQUIRE_TIMEOUT,
                Some(secs) => Duration::from_secs(secs),
            };

        let query_timeout =
            match parse_secs("DB_QUERY_TIMEOUT_SECS", get("DB_QUERY_TIMEOUT_SECS"))? {
                None => Some(DEFAULT_QUERY_TIMEOUT),
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
            };

        let reconnect_interval =
            parse_secs("DB_RECONNECT_INTERVAL_SECS", get("DB_RECONNECT_INTERVAL_SECS"))?
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs);

        Ok(Some(Self {
            target,
            max_connections,
            acquire_timeout,
            query_timeout,
            reconnect_interval,
        }))
    }

    /// Shrink the acquire and query timeouts so that together they end
    /// before `deadline`, the outer per-request limit.
    ///
    /// Leaves the settings alone when they already fit. Otherwise the
    /// acquire timeout is capped at a third of `deadline` and the query
    /// timeout at half of it, so a stalled backend surfaces as a database
    /// error instead of an outer timeout. Returns `true` when anything
    /// changed.
    pub fn fit_within(&mut self, deadline: Duration) -> bool {
        let total = self
            .query_timeout
            .and_then(|query| self.acquire_timeout.checked_add(query));
        if matches!(total, Some(total) if total < deadline) {
            return false;
        }

        let acquire_cap = deadline / 3;
        let query_cap = deadline / 2;
        self.acquire_timeout = self.acquire_timeout.min(acquire_cap);
        self.query_timeout = Some(match self.query_timeout {
            Some(query) => query.min(query_cap),
            None => query_cap,
        });
        true
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn parse_secs(var: &'static str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    raw.map(|value| value.parse().map_err(|_| ConfigError::Invalid { var, value }))
        .transpose()
}
