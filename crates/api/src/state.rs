use std::sync::Arc;

use portfolio_db::ConnectionManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the connection manager lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Owner of the database pool and its availability state.
    pub db: Arc<ConnectionManager>,
}
