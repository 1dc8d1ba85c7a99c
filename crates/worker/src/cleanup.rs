//! Periodic deletion of old scheduled notifications.
//!
//! Removes every record whose trigger time is older than the retention
//! window, whatever its status. Runs on a fixed interval using
//! `tokio::time::interval`.

use std::time::Duration;

use planner_core::scheduling::retention_cutoff;
use planner_core::types::Timestamp;
use planner_db::repositories::ScheduledNotificationRepo;
use planner_db::DbPool;
use tokio_util::sync::CancellationToken;

/// Run the cleanup loop until `cancel` fires.
pub async fn run(
    pool: DbPool,
    interval: Duration,
    retention_days: i64,
    cancel: CancellationToken,
) {
    tracing::info!(
        retention_days,
        interval_secs = interval.as_secs(),
        "Cleanup job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cleanup job stopping");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = purge_expired(&pool, chrono::Utc::now(), retention_days).await {
                    tracing::error!(error = %e, "Cleanup: purge failed");
                }
            }
        }
    }
}

/// Delete every record triggered before `now - retention_days`.
///
/// Returns the number of rows deleted.
pub async fn purge_expired(
    pool: &DbPool,
    now: Timestamp,
    retention_days: i64,
) -> Result<u64, sqlx::Error> {
    let cutoff = retention_cutoff(now, retention_days);
    let deleted = ScheduledNotificationRepo::delete_triggered_before(pool, cutoff).await?;

    if deleted > 0 {
        tracing::info!(deleted, %cutoff, "Cleanup: purged old notifications");
    } else {
        tracing::debug!(%cutoff, "Cleanup: no notifications to purge");
    }

    Ok(deleted)
}
