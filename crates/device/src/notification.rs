//! Notification content rendered by the alarm receiver.

use serde::Serialize;

use crate::receiver::AlarmBroadcast;
use crate::AlarmId;

/// Channel every alarm notification is posted to.
pub const CHANNEL_ID: &str = "daily_planner_channel";
pub const CHANNEL_NAME: &str = "Daily Planner";
pub const CHANNEL_DESCRIPTION: &str = "Daily Planner alarm notifications";

/// Vibration pattern for alarms: wait, buzz, pause, buzz, pause, buzz (ms).
pub const ALARM_VIBRATION: [u64; 6] = [0, 1000, 500, 1000, 500, 1000];

/// Offset from an alarm id to the request code of its Stop action.
pub const STOP_REQUEST_OFFSET: AlarmId = 1000;
/// Offset from an alarm id to the request code of its Snooze action.
pub const SNOOZE_REQUEST_OFFSET: AlarmId = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Default,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Alarm,
    Reminder,
}

/// Definition of a notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub importance: Importance,
    pub vibration: &'static [u64],
    /// Play the default alarm sound with alarm audio usage.
    pub alarm_sound: bool,
    pub public_on_lockscreen: bool,
}

impl ChannelSpec {
    /// The single high-importance channel used for alarms.
    pub fn alarms() -> Self {
        Self {
            id: CHANNEL_ID,
            name: CHANNEL_NAME,
            description: CHANNEL_DESCRIPTION,
            importance: Importance::Max,
            vibration: &ALARM_VIBRATION,
            alarm_sound: true,
            public_on_lockscreen: true,
        }
    }
}

/// A button on a notification that sends a broadcast back to the receiver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationAction {
    pub label: &'static str,
    /// Distinct per action so the OS does not merge the pending broadcasts.
    pub request_code: AlarmId,
    pub broadcast: AlarmBroadcast,
}

/// A notification ready to be posted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub channel_id: &'static str,
    pub title: String,
    pub body: String,
    pub importance: Importance,
    pub category: Category,
    /// Ongoing notifications cannot be swiped away.
    pub ongoing: bool,
    pub auto_cancel: bool,
    pub actions: Vec<NotificationAction>,
    /// Launch the app over the lock screen when posted.
    pub full_screen: bool,
}

impl Notification {
    /// The interactive notification shown when alarm `id` fires.
    ///
    /// Action request codes wrap on overflow; they only need to differ
    /// from each other.
    pub fn alarm(id: AlarmId, title: &str, body: &str, full_screen: bool) -> Self {
        Self {
            channel_id: CHANNEL_ID,
            title: title.to_string(),
            body: body.to_string(),
            importance: Importance::Max,
            category: Category::Alarm,
            ongoing: true,
            auto_cancel: false,
            actions: vec![
                NotificationAction {
                    label: "Stop",
                    request_code: id.wrapping_add(STOP_REQUEST_OFFSET),
                    broadcast: AlarmBroadcast::stop(id),
                },
                NotificationAction {
                    label: "Snooze",
                    request_code: id.wrapping_add(SNOOZE_REQUEST_OFFSET),
                    broadcast: AlarmBroadcast::snooze(id, title, body),
                },
            ],
            full_screen,
        }
    }

    /// A dismissible note confirming that an alarm was snoozed.
    pub fn snooze_confirmation(title: &str, minutes: u32) -> Self {
        Self {
            channel_id: CHANNEL_ID,
            title: format!("Snoozed: {title}"),
            body: format!("Reminder in {minutes} minutes"),
            importance: Importance::Default,
            category: Category::Reminder,
            ongoing: false,
            auto_cancel: true,
            actions: Vec::new(),
            full_screen: false,
        }
    }
}
