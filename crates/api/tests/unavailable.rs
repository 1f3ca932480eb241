//! Behaviour while the database is unavailable.
//!
//! No database is needed: the connection manager starts out `Unavailable`,
//! as it would when configuration is missing or the startup probe failed.

mod common;

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use common::{body_json, delete, get, minimal_project, post_json, put_json};

async fn assert_unavailable(response: axum::http::Response<axum::body::Body>) {
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"], "CONNECTION_UNAVAILABLE");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn list_returns_503() {
    assert_unavailable(get(common::build_unavailable_app(), "/api/projects").await).await;
}

#[tokio::test]
async fn get_returns_503() {
    assert_unavailable(get(common::build_unavailable_app(), "/api/projects/1").await).await;
}

#[tokio::test]
async fn create_returns_503() {
    let response = post_json(
        common::build_unavailable_app(),
        "/api/projects",
        minimal_project(),
    )
    .await;
    assert_unavailable(response).await;
}

#[tokio::test]
async fn update_returns_503() {
    let response = put_json(
        common::build_unavailable_app(),
        "/api/projects/1",
        minimal_project(),
    )
    .await;
    assert_unavailable(response).await;
}

#[tokio::test]
async fn delete_returns_503() {
    assert_unavailable(delete(common::build_unavailable_app(), "/api/projects/1").await).await;
}

#[tokio::test]
async fn availability_is_checked_before_input() {
    // Malformed id and body still answer 503: nothing is parsed first.
    assert_unavailable(get(common::build_unavailable_app(), "/api/projects/abc").await).await;
    let response = post_json(
        common::build_unavailable_app(),
        "/api/projects",
        serde_json::json!({}),
    )
    .await;
    assert_unavailable(response).await;
}

#[tokio::test]
async fn uninitialized_manager_is_also_unavailable() {
    let app = common::build_app(portfolio_db::ConnectionManager::new(None));
    assert_unavailable(get(app, "/api/projects").await).await;
}

#[tokio::test]
async fn health_still_responds() {
    let response = get(common::build_unavailable_app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["database"], "unavailable");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn lost_backend_answers_503_before_the_request_timeout() {
    let app = common::build_unreachable_app(Duration::from_secs(1));
    let started = Instant::now();
    let response = get(app, "/api/projects").await;

    assert!(started.elapsed() < common::test_config().request_timeout());
    assert_unavailable(response).await;
}

#[tokio::test]
async fn lost_backend_answers_503_on_writes() {
    let response = post_json(
        common::build_unreachable_app(Duration::from_secs(1)),
        "/api/projects",
        minimal_project(),
    )
    .await;
    assert_unavailable(response).await;
}

#[tokio::test]
async fn health_reports_lost_backend_promptly() {
    // Acquire would wait far longer than the probe is allowed to.
    let app = common::build_unreachable_app(Duration::from_secs(60));
    let started = Instant::now();
    let response = get(app, "/health").await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["database"], "unavailable");
}
