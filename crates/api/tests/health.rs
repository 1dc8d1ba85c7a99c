//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{bearer_for, body_json, get, post_json};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["pending_notifications"], 0);
    assert!(json["pool"]["size"].as_u64().unwrap() >= 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_pending_backlog(pool: PgPool) {
    let auth = bearer_for("alice");
    let body = json!({
        "token": "device-token-1",
        "title": "Stretch",
        "body": "Stand up and stretch",
        "triggerTime": "2099-01-01T09:00:00Z"
    });
    for _ in 0..2 {
        let response = post_json(
            common::build_test_app(pool.clone()),
            "/api/v1/scheduled-notifications",
            body.clone(),
            Some(&auth),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get(common::build_test_app(pool), "/health", None).await;
    assert_eq!(body_json(response).await["pending_notifications"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/this-route-does-not-exist", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn response_contains_x_request_id_header(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health", None).await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");

    // MakeRequestUuid produces a hyphenated UUID (36 chars).
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}
