use std::time::Duration;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use portfolio_db::ConnectionState;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database is usable, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Connection manager state after probing.
    pub database: &'static str,
}

/// Upper bound on the liveness probe, well below any request timeout.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// GET /health -- always answers, whatever the database state.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.state().await {
        ConnectionState::Ready => {
            match tokio::time::timeout(PROBE_TIMEOUT, state.db.health_check()).await {
                Ok(Ok(_)) => ConnectionState::Ready,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Database liveness probe failed");
                    ConnectionState::Unavailable
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_ms = PROBE_TIMEOUT.as_millis() as u64,
                        "Database liveness probe timed out"
                    );
                    ConnectionState::Unavailable
                }
            }
        }
        other => other,
    };

    let status = if database == ConnectionState::Ready {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database: database.as_str(),
    })
}

/// Mount health check routes (root level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
