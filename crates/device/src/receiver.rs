//! Handling of alarm broadcasts delivered by the OS.
//!
//! Every broadcast carries an action tag. [`AlarmAction::from_tag`] turns the
//! tag into a variant and [`AlarmReceiver::handle`] runs exactly one handler
//! for it.

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;
use crate::notification::Notification;
use crate::scheduler::{AlarmRequest, AlarmScheduler};
use crate::AlarmId;

pub const ACTION_FIRE: &str = "daily_planner.ALARM";
pub const ACTION_STOP: &str = "daily_planner.STOP";
pub const ACTION_SNOOZE: &str = "daily_planner.SNOOZE";
pub const ACTION_KEEP_ALIVE: &str = "daily_planner.KEEP_ALIVE";
pub const ACTION_BOOT_COMPLETED: &str = "android.intent.action.BOOT_COMPLETED";
pub const ACTION_PACKAGE_REPLACED: &str = "android.intent.action.MY_PACKAGE_REPLACED";

pub const DEFAULT_TITLE: &str = "Reminder";
pub const DEFAULT_BODY: &str = "You have a reminder!";

/// Offset from an alarm id to the id of its snoozed replacement.
pub const SNOOZE_ID_OFFSET: AlarmId = 9_999;
/// Offset from an alarm id to its snooze confirmation notification.
pub const CONFIRMATION_ID_OFFSET: AlarmId = 10_000;

/// What a broadcast asks the receiver to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmAction {
    Fire,
    Stop,
    Snooze,
    Reboot,
    KeepAlive,
}

impl AlarmAction {
    /// Map a broadcast action tag to an action. Unknown or missing tags fire.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some(ACTION_STOP) => Self::Stop,
            Some(ACTION_SNOOZE) => Self::Snooze,
            Some(ACTION_KEEP_ALIVE) => Self::KeepAlive,
            Some(ACTION_BOOT_COMPLETED | ACTION_PACKAGE_REPLACED) => Self::Reboot,
            _ => Self::Fire,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Fire => ACTION_FIRE,
            Self::Stop => ACTION_STOP,
            Self::Snooze => ACTION_SNOOZE,
            Self::Reboot => ACTION_BOOT_COMPLETED,
            Self::KeepAlive => ACTION_KEEP_ALIVE,
        }
    }
}

/// The extras of an alarm broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmBroadcast {
    pub action: Option<String>,
    pub id: Option<AlarmId>,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl AlarmBroadcast {
    pub fn fire(id: AlarmId, title: &str, body: &str) -> Self {
        Self {
            action: Some(ACTION_FIRE.to_string()),
            id: Some(id),
            title: Some(title.to_string()),
            body: Some(body.to_string()),
        }
    }

    /// A fire broadcast without content, used when only the id survived.
    pub fn fire_default(id: AlarmId) -> Self {
        Self {
            action: Some(ACTION_FIRE.to_string()),
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn stop(id: AlarmId) -> Self {
        Self {
            action: Some(ACTION_STOP.to_string()),
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn snooze(id: AlarmId, title: &str, body: &str) -> Self {
        Self {
            action: Some(ACTION_SNOOZE.to_string()),
            ..Self::fire(id, title, body)
        }
    }

    pub fn keep_alive() -> Self {
        Self {
            action: Some(ACTION_KEEP_ALIVE.to_string()),
            ..Self::default()
        }
    }

    pub fn action(&self) -> AlarmAction {
        AlarmAction::from_tag(self.action.as_deref())
    }

    fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    fn body(&self) -> &str {
        self.body.as_deref().unwrap_or(DEFAULT_BODY)
    }
}

/// Entry point for every alarm-related broadcast.
///
/// Heartbeat policy: Fire, Reboot and KeepAlive re-arm the heartbeat;
/// Stop and Snooze leave it alone.
pub struct AlarmReceiver {
    scheduler: AlarmScheduler,
}

impl AlarmReceiver {
    pub fn new(scheduler: AlarmScheduler) -> Self {
        Self { scheduler }
    }

    /// Run the handler for `broadcast` and return the action taken.
    pub fn handle(&self, broadcast: &AlarmBroadcast) -> Result<AlarmAction, DeviceError> {
        let action = broadcast.action();
        tracing::debug!(?action, id = ?broadcast.id, "Alarm broadcast received");

        match action {
            AlarmAction::Fire => self.on_fire(broadcast)?,
            AlarmAction::Stop => self.on_stop(broadcast)?,
            AlarmAction::Snooze => self.on_snooze(broadcast)?,
            AlarmAction::Reboot => self.on_reboot()?,
            AlarmAction::KeepAlive => self.rearm_heartbeat(),
        }
        Ok(action)
    }

    fn on_fire(&self, broadcast: &AlarmBroadcast) -> Result<(), DeviceError> {
        self.scheduler.ensure_channel();

        let id = broadcast.id.unwrap_or(0);
        let notification = Notification::alarm(
            id,
            broadcast.title(),
            broadcast.body(),
            self.scheduler.config().full_screen_intent,
        );
        self.scheduler
            .platform()
            .notifications
            .show(id, &notification)?;
        tracing::info!(id, "Alarm notification displayed");

        self.rearm_heartbeat();
        Ok(())
    }

    fn on_stop(&self, broadcast: &AlarmBroadcast) -> Result<(), DeviceError> {
        let Some(id) = broadcast.id else {
            tracing::warn!("Stop broadcast without an alarm id; ignored");
            return Ok(());
        };

        self.scheduler.cancel_notification(id);
        self.scheduler.store().remove(id)?;
        if let Err(e) = self.scheduler.platform().alarms.cancel(id) {
            tracing::warn!(id, error = %e, "Failed to cancel OS alarm");
        }
        tracing::info!(id, "Alarm stopped");
        Ok(())
    }

    fn on_snooze(&self, broadcast: &AlarmBroadcast) -> Result<(), DeviceError> {
        let Some(id) = broadcast.id else {
            tracing::warn!("Snooze broadcast without an alarm id; ignored");
            return Ok(());
        };

        let (Some(snoozed_id), Some(confirmation_id)) = (
            id.checked_add(SNOOZE_ID_OFFSET),
            id.checked_add(CONFIRMATION_ID_OFFSET),
        ) else {
            return Err(DeviceError::InvalidAlarmId(id));
        };

        self.scheduler.cancel_notification(id);

        let config = self.scheduler.config();
        let request = AlarmRequest {
            id: snoozed_id,
            fire_at_millis: self.scheduler.platform().clock.now_millis() + config.snooze_millis(),
            title: broadcast.title().to_string(),
            body: broadcast.body().to_string(),
        };
        self.scheduler.schedule(&request)?;

        if config.confirmations {
            let confirmation =
                Notification::snooze_confirmation(broadcast.title(), config.snooze_minutes);
            if let Err(e) = self
                .scheduler
                .platform()
                .notifications
                .show(confirmation_id, &confirmation)
            {
                tracing::warn!(id, error = %e, "Failed to show snooze confirmation");
            }
        }

        tracing::info!(
            id,
            snoozed_id = request.id,
            minutes = config.snooze_minutes,
            "Alarm snoozed"
        );
        Ok(())
    }

    fn on_reboot(&self) -> Result<(), DeviceError> {
        self.scheduler.restore_all()?;
        self.rearm_heartbeat();
        Ok(())
    }

    fn rearm_heartbeat(&self) {
        if let Err(e) = self.scheduler.arm_heartbeat() {
            tracing::warn!(error = %e, "Failed to arm heartbeat");
        }
    }
}
