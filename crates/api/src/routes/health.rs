//! Root-level liveness endpoint.
//!
//! Reports database reachability together with the size of the pending
//! backlog the dispatcher still has to work through, and answers 503 when
//! the database cannot be reached.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use planner_db::models::status::NotificationStatus;
use planner_db::repositories::ScheduledNotificationRepo;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Notifications still waiting for delivery; absent when the database
    /// is unreachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_notifications: Option<i64>,
    pub pool: PoolStats,
}

#[derive(Debug, Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = planner_db::health_check(&state.pool).await.is_ok();

    let pending_notifications = if db_healthy {
        ScheduledNotificationRepo::count_by_status(&state.pool, NotificationStatus::Pending)
            .await
            .map_err(|e| tracing::warn!(error = %e, "Failed to count pending notifications"))
            .ok()
    } else {
        None
    };

    let (code, status) = if db_healthy {
        (StatusCode::OK, "ok")
    } else {
        tracing::warn!("Health check: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        pending_notifications,
        pool: PoolStats {
            size: state.pool.size(),
            idle: state.pool.num_idle(),
        },
    };
    (code, Json(body))
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
