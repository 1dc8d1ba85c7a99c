//! Scheduled notification entity model and DTOs.

use planner_core::scheduling::ValidatedSchedule;
use planner_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::status::StatusId;

/// A row from the `scheduled_notifications` table, joined with its status name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduledNotification {
    pub id: DbId,
    pub user_id: String,
    pub token: String,
    pub title: String,
    pub body: String,
    pub trigger_time: Timestamp,
    pub status_id: StatusId,
    /// Status name from `notification_statuses` (`pending`, `sent`, `failed`).
    pub status: String,
    pub payload: Option<serde_json::Value>,
    pub error: Option<String>,
    pub sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new pending notification.
#[derive(Debug, Clone)]
pub struct CreateScheduledNotification {
    pub user_id: String,
    pub token: String,
    pub title: String,
    pub body: String,
    pub trigger_time: Timestamp,
    pub payload: Option<serde_json::Value>,
}

impl CreateScheduledNotification {
    /// Attach the owning user to a validated request.
    pub fn from_validated(user_id: impl Into<String>, validated: ValidatedSchedule) -> Self {
        Self {
            user_id: user_id.into(),
            token: validated.token,
            title: validated.title,
            body: validated.body,
            trigger_time: validated.trigger_time,
            payload: validated.payload,
        }
    }
}
