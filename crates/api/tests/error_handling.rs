//! Tests for `AppError` → HTTP response mapping.
//!
//! The first group calls `IntoResponse` directly on `AppError` values; the
//! second sends malformed requests through the full router and checks that
//! extractor rejections keep the JSON error envelope.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use planner_api::error::AppError;
use planner_core::error::CoreError;
use sqlx::PgPool;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn unauthorized_maps_to_unauthenticated() {
    let err = AppError::Core(CoreError::Unauthorized("Authentication required".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHENTICATED");
    assert_eq!(json["error"], "Authentication required");
}

#[tokio::test]
async fn validation_maps_to_invalid_argument() {
    let err = AppError::Core(CoreError::Validation("Missing required fields".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_ARGUMENT");
    assert_eq!(json["error"], "Missing required fields");
}

#[tokio::test]
async fn bad_request_maps_to_invalid_argument() {
    let (status, json) = error_to_response(AppError::BadRequest("malformed JSON".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn not_found_names_entity() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "ScheduledNotification",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "ScheduledNotification with id 42 not found");
}

#[tokio::test]
async fn internal_error_is_sanitized() {
    let err = AppError::Database(sqlx::Error::Protocol(
        "connection string with password".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_maps_to_404() {
    let (status, _) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn core_error_converts_into_app_error() {
    let app: AppError = CoreError::Validation("x".into()).into();
    assert_matches!(app, AppError::Core(CoreError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Extractor rejections through the router
// ---------------------------------------------------------------------------

const ENDPOINT: &str = "/api/v1/scheduled-notifications";

async fn assert_invalid_argument(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "INVALID_ARGUMENT");
    assert!(json["error"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_numeric_path_id_is_invalid_argument(pool: PgPool) {
    let auth = common::bearer_for("alice");
    let response = common::get(
        common::build_test_app(pool),
        &format!("{ENDPOINT}/abc"),
        Some(&auth),
    )
    .await;

    assert_invalid_argument(response).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_numeric_limit_is_invalid_argument(pool: PgPool) {
    let auth = common::bearer_for("alice");
    let response = common::get(
        common::build_test_app(pool),
        &format!("{ENDPOINT}?limit=lots"),
        Some(&auth),
    )
    .await;

    assert_invalid_argument(response).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_json_body_is_invalid_argument(pool: PgPool) {
    let auth = common::bearer_for("alice");
    let response = common::post_raw(
        common::build_test_app(pool.clone()),
        ENDPOINT,
        "{\"token\": \"abc\",",
        Some(&auth),
    )
    .await;

    assert_invalid_argument(response).await;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scheduled_notifications")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
