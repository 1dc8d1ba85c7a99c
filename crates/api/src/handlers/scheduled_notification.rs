//! Handlers for the `/scheduled-notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`]; callers only ever
//! see their own records.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use planner_core::error::CoreError;
use planner_core::scheduling::{state_machine, validate_schedule_request, ScheduleRequest};
use planner_core::types::DbId;
use planner_db::models::scheduled_notification::CreateScheduledNotification;
use planner_db::repositories::ScheduledNotificationRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Successful schedule response, serialized as `{ success, notificationId }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub success: bool,
    pub notification_id: DbId,
}

/// Query parameters for `GET /scheduled-notifications`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Filter by status name (`pending`, `sent`, `failed`).
    pub status: Option<String>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Maximum page size for listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for listing.
const DEFAULT_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/scheduled-notifications
///
/// Validate the request and store a pending notification owned by the
/// caller. Returns 201 with the new notification's ID.
pub async fn schedule_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<ScheduleRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let validated = validate_schedule_request(request, Utc::now())?;
    let input = CreateScheduledNotification::from_validated(auth.user_id, validated);

    let notification_id = ScheduledNotificationRepo::create(&state.pool, &input).await?;

    tracing::info!(
        notification_id,
        user_id = %input.user_id,
        trigger_time = %input.trigger_time,
        "Scheduled notification stored",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ScheduleResponse {
                success: true,
                notification_id,
            },
        }),
    ))
}

/// GET /api/v1/scheduled-notifications
///
/// List the caller's notifications, latest trigger time first.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let status_id = match params.status.as_deref() {
        None => None,
        Some(name) => Some(state_machine::status_id(name).ok_or_else(|| {
            CoreError::Validation(format!("Unknown status filter: {name}"))
        })?),
    };

    let notifications = ScheduledNotificationRepo::list_for_user(
        &state.pool,
        &auth.user_id,
        status_id,
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// GET /api/v1/scheduled-notifications/{id}
///
/// Return one of the caller's notifications, or 404.
pub async fn get_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let notification = ScheduledNotificationRepo::find_for_user(&state.pool, id, &auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ScheduledNotification",
            id,
        }))?;

    Ok(Json(DataResponse { data: notification }))
}
