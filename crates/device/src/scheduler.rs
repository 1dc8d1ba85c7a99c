//! Arming, cancelling, and restoring local alarms.

use std::sync::Arc;

use crate::config::{DeviceConfig, ExactAlarmFallback};
use crate::error::DeviceError;
use crate::notification::ChannelSpec;
use crate::ports::{AlarmMode, Platform};
use crate::receiver::AlarmBroadcast;
use crate::store::AlarmStore;
use crate::{AlarmId, EpochMillis};

/// Reserved id of the keep-alive heartbeat timer. Never persisted.
///
/// Lies below the host's 32-bit id range, which every derived id offset
/// only moves upwards from.
pub const HEARTBEAT_ALARM_ID: AlarmId = i32::MIN as AlarmId - 1;

/// Offsets of the notification ids that may be derived from an alarm id
/// (the alarm itself plus confirmation notifications).
pub const DERIVED_NOTIFICATION_OFFSETS: [AlarmId; 5] = [0, 10_000, 20_000, 30_000, 40_000];

/// A request to arm a local alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmRequest {
    pub id: AlarmId,
    pub fire_at_millis: EpochMillis,
    pub title: String,
    pub body: String,
}

/// How an alarm request was honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Armed(AlarmMode),
    /// Exact alarms are not permitted and the fallback is `Skip`.
    Skipped,
}

/// Result of [`AlarmScheduler::restore_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    /// Records whose fire time had passed, removed from the store.
    pub pruned: usize,
}

/// Arms and disarms OS alarms and keeps the [`AlarmStore`] in step.
#[derive(Clone)]
pub struct AlarmScheduler {
    platform: Platform,
    store: Arc<AlarmStore>,
    config: DeviceConfig,
}

impl AlarmScheduler {
    pub fn new(platform: Platform, store: Arc<AlarmStore>, config: DeviceConfig) -> Self {
        Self {
            platform,
            store,
            config,
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn store(&self) -> &AlarmStore {
        &self.store
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Arm alarm `request.id` and record it for reboot recovery.
    ///
    /// Re-scheduling an armed id replaces its timer and record. The
    /// heartbeat id is rejected.
    pub fn schedule(&self, request: &AlarmRequest) -> Result<ScheduleOutcome, DeviceError> {
        if request.id == HEARTBEAT_ALARM_ID {
            return Err(DeviceError::InvalidAlarmId(request.id));
        }
        self.ensure_channel();

        let broadcast = AlarmBroadcast::fire(request.id, &request.title, &request.body);
        let outcome = self.arm(request.id, request.fire_at_millis, broadcast)?;

        if let ScheduleOutcome::Armed(mode) = outcome {
            self.store.put(request.id, request.fire_at_millis)?;
            tracing::info!(
                id = request.id,
                fire_at = request.fire_at_millis,
                ?mode,
                "Alarm scheduled"
            );
        }
        Ok(outcome)
    }

    /// Disarm alarm `id`, clear its notifications, and forget it.
    pub fn cancel(&self, id: AlarmId) -> Result<(), DeviceError> {
        if let Err(e) = self.platform.alarms.cancel(id) {
            tracing::warn!(id, error = %e, "Failed to cancel OS alarm");
        }
        for derived in DERIVED_NOTIFICATION_OFFSETS
            .iter()
            .filter_map(|offset| id.checked_add(*offset))
        {
            self.cancel_notification(derived);
        }
        self.store.remove(id)?;
        tracing::info!(id, "Alarm cancelled");
        Ok(())
    }

    /// Re-arm every stored alarm that is still in the future and drop the
    /// rest. Restored alarms fire with the default title and body.
    pub fn restore_all(&self) -> Result<RestoreReport, DeviceError> {
        let now = self.platform.clock.now_millis();
        let mut report = RestoreReport::default();

        for (id, fire_at) in self.store.all()? {
            if fire_at <= now {
                self.store.remove(id)?;
                report.pruned += 1;
                continue;
            }
            match self.arm(id, fire_at, AlarmBroadcast::fire_default(id)) {
                Ok(ScheduleOutcome::Armed(_)) => report.restored += 1,
                Ok(ScheduleOutcome::Skipped) => {}
                Err(e) => tracing::error!(id, error = %e, "Failed to restore alarm"),
            }
        }

        tracing::info!(
            restored = report.restored,
            pruned = report.pruned,
            "Alarms restored"
        );
        Ok(report)
    }

    /// Arm (or replace) the keep-alive heartbeat one interval from now.
    ///
    /// The heartbeat ignores the skip fallback: it is armed inexactly when
    /// exact alarms are not permitted.
    pub fn arm_heartbeat(&self) -> Result<(), DeviceError> {
        let at = self.platform.clock.now_millis() + self.config.heartbeat_millis();
        let mode = if self.platform.alarms.can_schedule_exact() {
            AlarmMode::Exact
        } else {
            AlarmMode::Inexact
        };
        self.platform
            .alarms
            .set(HEARTBEAT_ALARM_ID, at, mode, AlarmBroadcast::keep_alive())?;
        tracing::debug!(fire_at = at, "Heartbeat armed");
        Ok(())
    }

    pub(crate) fn ensure_channel(&self) {
        if let Err(e) = self
            .platform
            .notifications
            .ensure_channel(&ChannelSpec::alarms())
        {
            tracing::warn!(error = %e, "Failed to create notification channel");
        }
    }

    pub(crate) fn cancel_notification(&self, id: AlarmId) {
        if let Err(e) = self.platform.notifications.cancel(id) {
            tracing::warn!(id, error = %e, "Failed to cancel notification");
        }
    }

    fn arm(
        &self,
        id: AlarmId,
        at: EpochMillis,
        broadcast: AlarmBroadcast,
    ) -> Result<ScheduleOutcome, DeviceError> {
        let mode = if self.platform.alarms.can_schedule_exact() {
            AlarmMode::Exact
        } else {
            match self.config.exact_alarm_fallback {
                ExactAlarmFallback::Inexact => {
                    tracing::warn!(id, "Exact alarms not permitted; arming inexact alarm");
                    AlarmMode::Inexact
                }
                ExactAlarmFallback::Skip => {
                    tracing::warn!(id, "Exact alarms not permitted; alarm skipped");
                    return Ok(ScheduleOutcome::Skipped);
                }
            }
        };
        self.platform.alarms.set(id, at, mode, broadcast)?;
        Ok(ScheduleOutcome::Armed(mode))
    }
}
