use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_api::config::ServerConfig;
use portfolio_api::router::build_app_router;
use portfolio_api::state::AppState;
use portfolio_db::reconnect::{self, ReconnectConfig};
use portfolio_db::{ConnectionManager, ConnectionState, DatabaseConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "portfolio_api=debug,portfolio_db=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid server configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let host: IpAddr = match config.host.parse() {
        Ok(host) => host,
        Err(e) => {
            tracing::error!(host = %config.host, error = %e, "Invalid HOST address");
            std::process::exit(1);
        }
    };

    // --- Database (best effort) ---
    let mut db_config = DatabaseConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid database configuration; running without a database");
        None
    });
    if let Some(db_config) = db_config.as_mut() {
        if db_config.fit_within(config.request_timeout()) {
            tracing::warn!(
                request_timeout_secs = config.request_timeout_secs,
                acquire_timeout_ms = db_config.acquire_timeout.as_millis() as u64,
                query_timeout_ms = db_config.query_timeout.map(|t| t.as_millis() as u64),
                "Database timeouts exceed the request timeout; shrinking them"
            );
        }
    }
    let db = Arc::new(ConnectionManager::new(db_config));
    let db_state = db.initialize().await;

    // --- Optional background reconnection ---
    let reconnect_cancel = CancellationToken::new();
    let reconnect_handle = match db.config().and_then(|c| c.reconnect_interval) {
        Some(interval) if db_state == ConnectionState::Unavailable => {
            tracing::info!(
                initial_delay_secs = interval.as_secs(),
                "Database reconnection enabled"
            );
            Some(reconnect::spawn(
                Arc::clone(&db),
                ReconnectConfig::starting_at(interval),
                reconnect_cancel.clone(),
            ))
        }
        _ => None,
    };

    // --- App state ---
    let state = AppState {
        db: Arc::clone(&db),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(host, config.port);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind to address");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "Server listening");
    if db_state != ConnectionState::Ready {
        tracing::warn!("Database is not connected; /api/projects will answer 503");
    }

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    reconnect_cancel.cancel();
    if let Some(handle) = reconnect_handle {
        let _ = handle.await;
    }

    db.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
