//! Background reconnection for a manager that failed to come up.
//!
//! Disabled unless `DB_RECONNECT_INTERVAL_SECS` is set. When enabled,
//! [`spawn`] retries [`ConnectionManager::initialize`] with exponential
//! backoff until the manager is `Ready` or the [`CancellationToken`] fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::manager::{ConnectionManager, ConnectionState};

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(300),
            multiplier: 2.0,
        }
    }
}

impl ReconnectConfig {
    pub fn starting_at(initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            ..Default::default()
        }
    }
}

/// Calculate the next backoff delay, clamped to [`ReconnectConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ReconnectConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Retry initialization until the manager is `Ready`.
///
/// Returns `true` once ready, `false` if cancelled or if the manager has no
/// configuration to retry with.
pub async fn reconnect_loop(
    manager: &ConnectionManager,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> bool {
    if manager.config().is_none() {
        return false;
    }

    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        if manager.state().await == ConnectionState::Ready {
            return true;
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Database reconnect cancelled");
                return false;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
        tracing::info!(attempt, "Retrying database connection");

        if manager.initialize().await == ConnectionState::Ready {
            tracing::info!(attempt, "Database reconnected");
            return true;
        }

        delay = next_delay(delay, config);
        tracing::warn!(
            attempt,
            next_delay_ms = delay.as_millis() as u64,
            "Database reconnect attempt {attempt} failed",
        );
    }
}

/// Spawn [`reconnect_loop`] on the runtime.
pub fn spawn(
    manager: Arc<ConnectionManager>,
    config: ReconnectConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        reconnect_loop(&manager, &config, &cancel).await;
    })
}
