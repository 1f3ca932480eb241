#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::MySqlPool;
use tower::ServiceExt;

use portfolio_api::config::ServerConfig;
use portfolio_api::router::build_app_router;
use portfolio_api::state::AppState;
use portfolio_db::ConnectionManager;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
    }
}

/// Build the full application router around the given connection manager.
///
/// Uses the same builder as `main.rs`, so tests exercise the production
/// middleware stack.
pub fn build_app(db: ConnectionManager) -> Router {
    let state = AppState { db: Arc::new(db) };
    build_app_router(state, &test_config())
}

/// Router backed by a ready manager over the given pool.
pub fn build_test_app(pool: MySqlPool) -> Router {
    build_app(ConnectionManager::from_pool(
        pool,
        Some(Duration::from_secs(10)),
    ))
}

/// Router whose manager is `Ready` but whose backend has gone away.
///
/// The pool connects lazily to a port nothing listens on, so every acquire
/// fails after `acquire_timeout`.
pub fn build_unreachable_app(acquire_timeout: Duration) -> Router {
    let options = "mysql://nobody@127.0.0.1:1/portfolio"
        .parse::<MySqlConnectOptions>()
        .unwrap();
    let pool = MySqlPoolOptions::new()
        .acquire_timeout(acquire_timeout)
        .connect_lazy_with(options);
    build_app(ConnectionManager::from_pool(pool, None))
}

/// Router whose database never came up.
pub fn build_unavailable_app() -> Router {
    build_app(ConnectionManager::unavailable())
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A body carrying every required field.
pub fn minimal_project() -> serde_json::Value {
    serde_json::json!({
        "title": "A",
        "description": "B",
        "technologies": "C",
        "status": "active",
    })
}
