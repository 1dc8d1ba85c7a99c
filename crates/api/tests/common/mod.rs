#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use planner_api::auth::jwt::{generate_access_token, JwtConfig};
use planner_api::config::ServerConfig;
use planner_api::router::build_app_router;
use planner_api::state::AppState;

const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
    }
}

/// Build the full application router, including the production middleware
/// stack, over the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// A valid `Authorization` header value for `user_id`.
pub fn bearer_for(user_id: &str) -> String {
    let token = generate_access_token(user_id, 15, &test_config().jwt)
        .expect("token generation should succeed");
    format!("Bearer {token}")
}

/// Send a GET request, optionally authenticated.
pub async fn get(app: Router, uri: &str, auth: Option<&str>) -> Response {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Send a POST request with a JSON body, optionally authenticated.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    auth: Option<&str>,
) -> Response {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Send a POST request with a raw, possibly malformed, JSON body.
pub async fn post_raw(app: Router, uri: &str, body: &str, auth: Option<&str>) -> Response {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
