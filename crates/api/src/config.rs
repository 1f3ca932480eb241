use std::time::Duration;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`, must be positive).
    pub request_timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: '{value}'")]
    Invalid { var: &'static str, value: String },
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value })?,
            None => defaults.port,
        };

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "REQUEST_TIMEOUT_SECS",
                value,
            })?,
            None => defaults.request_timeout_secs,
        };
        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "REQUEST_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn port_is_read_from_env() {
        let config = ServerConfig::from_lookup(|key| match key {
            "PORT" => Some("8080".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn malformed_port_is_an_error() {
        let err = ServerConfig::from_lookup(|key| match key {
            "PORT" => Some("eighty".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "PORT has an invalid value: 'eighty'");
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        let err = ServerConfig::from_lookup(|key| match key {
            "REQUEST_TIMEOUT_SECS" => Some("0".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "REQUEST_TIMEOUT_SECS",
                ..
            }
        ));
    }
}
