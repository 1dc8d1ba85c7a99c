//! Periodic delivery of due scheduled notifications.
//!
//! [`Dispatcher`] polls on a fixed interval for pending records whose trigger
//! time has passed, sends each one through a [`PushSender`], and records the
//! outcome. Each record gets exactly one attempt: success marks it sent,
//! failure marks it failed with the error text. There is no retry.

use std::sync::Arc;
use std::time::Duration;

use planner_core::types::Timestamp;
use planner_db::models::scheduled_notification::ScheduledNotification;
use planner_db::repositories::ScheduledNotificationRepo;
use planner_db::DbPool;
use planner_push::{build_message, PushSender};
use tokio_util::sync::CancellationToken;

/// Outcome counts for a single dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Due records picked up by this pass.
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Background service that delivers due notifications.
pub struct Dispatcher {
    pool: DbPool,
    sender: Arc<dyn PushSender>,
}

impl Dispatcher {
    pub fn new(pool: DbPool, sender: Arc<dyn PushSender>) -> Self {
        Self { pool, sender }
    }

    /// Run the dispatch loop until `cancel` fires.
    ///
    /// The first tick completes immediately, so records that fell due while
    /// the worker was down go out on startup.
    pub async fn run(&self, interval: Duration, cancel: CancellationToken) {
        tracing::info!(interval_secs = interval.as_secs(), "Dispatcher started");

        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Dispatcher stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.dispatch_due(chrono::Utc::now()).await {
                        tracing::error!(error = %e, "Dispatch pass failed");
                    }
                }
            }
        }
    }

    /// Attempt delivery of every pending notification due at `now`.
    ///
    /// Send failures are recorded per record and never abort the pass.
    /// Only a failure to query or update the database is returned.
    pub async fn dispatch_due(&self, now: Timestamp) -> Result<DispatchReport, sqlx::Error> {
        let due = ScheduledNotificationRepo::list_due(&self.pool, now).await?;

        let mut report = DispatchReport {
            attempted: due.len(),
            ..DispatchReport::default()
        };

        for notification in &due {
            if self.deliver(notification).await? {
                report.sent += 1;
            } else {
                report.failed += 1;
            }
        }

        if report.attempted > 0 {
            tracing::info!(
                attempted = report.attempted,
                sent = report.sent,
                failed = report.failed,
                "Dispatch pass complete",
            );
        } else {
            tracing::debug!("Dispatch pass: nothing due");
        }

        Ok(report)
    }

    /// Send one notification and persist the result. Returns `true` when sent.
    async fn deliver(&self, notification: &ScheduledNotification) -> Result<bool, sqlx::Error> {
        let message = build_message(
            &notification.token,
            &notification.title,
            &notification.body,
            notification.payload.as_ref(),
        );

        match self.sender.send(&message).await {
            Ok(message_id) => {
                ScheduledNotificationRepo::mark_sent(&self.pool, notification.id).await?;
                tracing::debug!(
                    notification_id = notification.id,
                    message_id = %message_id,
                    "Notification sent",
                );
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(
                    notification_id = notification.id,
                    user_id = %notification.user_id,
                    error = %e,
                    "Notification delivery failed",
                );
                ScheduledNotificationRepo::mark_failed(&self.pool, notification.id, &e.to_string())
                    .await?;
                Ok(false)
            }
        }
    }
}
