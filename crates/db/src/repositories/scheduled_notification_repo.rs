//! Repository for the `scheduled_notifications` table.
//!
//! Status updates are guarded by the core state machine: a row is only
//! rewritten when its current status may transition to the target, so a
//! record that already reached Sent or Failed is never rewritten.

use planner_core::scheduling::state_machine;
use planner_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::scheduled_notification::{
    CreateScheduledNotification, ScheduledNotification,
};
use crate::models::status::{NotificationStatus, StatusId};

/// Column list for `scheduled_notifications` queries, aliased `n`, joined
/// with `notification_statuses` aliased `s`.
const COLUMNS: &str = "n.id, n.user_id, n.token, n.title, n.body, n.trigger_time, \
     n.status_id, s.name AS status, n.payload, n.error, n.sent_at, n.created_at, n.updated_at";

const FROM: &str = "FROM scheduled_notifications n \
     JOIN notification_statuses s ON s.id = n.status_id";

/// Status IDs from which `to` is a valid transition.
fn allowed_sources(to: NotificationStatus) -> Vec<StatusId> {
    NotificationStatus::ALL
        .iter()
        .map(|s| s.id())
        .filter(|&from| state_machine::can_transition(from, to.id()))
        .collect()
}

/// Provides CRUD operations for scheduled notifications.
pub struct ScheduledNotificationRepo;

impl ScheduledNotificationRepo {
    /// Insert a pending notification, returning the generated ID.
    pub async fn create(
        pool: &PgPool,
        input: &CreateScheduledNotification,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO scheduled_notifications \
                 (user_id, token, title, body, trigger_time, status_id, payload) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id",
        )
        .bind(&input.user_id)
        .bind(&input.token)
        .bind(&input.title)
        .bind(&input.body)
        .bind(input.trigger_time)
        .bind(NotificationStatus::Pending.id())
        .bind(&input.payload)
        .fetch_one(pool)
        .await
    }

    /// Find a notification by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ScheduledNotification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} {FROM} WHERE n.id = $1");
        sqlx::query_as::<_, ScheduledNotification>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a notification by ID, only if it belongs to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: &str,
    ) -> Result<Option<ScheduledNotification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} {FROM} WHERE n.id = $1 AND n.user_id = $2");
        sqlx::query_as::<_, ScheduledNotification>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's notifications, latest trigger time first.
    ///
    /// When `status_id` is `Some`, only rows with that status are returned.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: &str,
        status_id: Option<StatusId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ScheduledNotification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} {FROM} \
             WHERE n.user_id = $1 AND ($2::SMALLINT IS NULL OR n.status_id = $2) \
             ORDER BY n.trigger_time DESC, n.id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ScheduledNotification>(&query)
            .bind(user_id)
            .bind(status_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List every pending notification whose trigger time is at or before `now`.
    pub async fn list_due(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Vec<ScheduledNotification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} {FROM} \
             WHERE n.status_id = $1 AND n.trigger_time <= $2 \
             ORDER BY n.trigger_time ASC, n.id ASC"
        );
        sqlx::query_as::<_, ScheduledNotification>(&query)
            .bind(NotificationStatus::Pending.id())
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// Count notifications currently in `status`.
    pub async fn count_by_status(
        pool: &PgPool,
        status: NotificationStatus,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM scheduled_notifications WHERE status_id = $1")
            .bind(status.id())
            .fetch_one(pool)
            .await
    }

    /// Mark a pending notification as sent.
    ///
    /// Returns `false` if the row no longer exists or is not pending.
    pub async fn mark_sent(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE scheduled_notifications \
             SET status_id = $2, sent_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = ANY($3)",
        )
        .bind(id)
        .bind(NotificationStatus::Sent.id())
        .bind(allowed_sources(NotificationStatus::Sent))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a pending notification as failed, recording the error message.
    ///
    /// Returns `false` if the row no longer exists or is not pending.
    pub async fn mark_failed(pool: &PgPool, id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE scheduled_notifications \
             SET status_id = $2, error = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id = ANY($4)",
        )
        .bind(id)
        .bind(NotificationStatus::Failed.id())
        .bind(error)
        .bind(allowed_sources(NotificationStatus::Failed))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every notification triggered strictly before `cutoff`,
    /// regardless of status. Returns the number of rows deleted.
    pub async fn delete_triggered_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scheduled_notifications WHERE trigger_time < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_are_only_reachable_from_pending() {
        assert_eq!(allowed_sources(NotificationStatus::Sent), vec![1]);
        assert_eq!(allowed_sources(NotificationStatus::Failed), vec![1]);
        assert!(allowed_sources(NotificationStatus::Pending).is_empty());
    }
}
