//! FCM v1 message construction.
//!
//! Every scheduled notification is sent with the same presentation hints:
//! high Android priority on the app's alarm channel, default sound on both
//! platforms, a badge on iOS, and two fixed data fields that let the client
//! recognise the message as a scheduled notification.

use std::collections::BTreeMap;

use serde::Serialize;

/// Android notification channel the app registers for reminders.
pub const ANDROID_CHANNEL_ID: &str = "daily_planner_channel";

/// Click action understood by the Flutter messaging plugin.
pub const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Value of the `type` data field on every scheduled notification.
pub const MESSAGE_TYPE: &str = "scheduled_notification";

/// Request body for `messages:send`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SendRequest<'a> {
    pub message: &'a PushMessage,
}

/// A single-device FCM message.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PushMessage {
    pub token: String,
    pub notification: NotificationBlock,
    pub android: AndroidConfig,
    pub apns: ApnsConfig,
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotificationBlock {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AndroidConfig {
    pub priority: &'static str,
    pub notification: AndroidNotification,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AndroidNotification {
    pub sound: &'static str,
    pub channel_id: &'static str,
    pub click_action: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Aps {
    pub sound: &'static str,
    #[serde(rename = "content-available")]
    pub content_available: u8,
    pub badge: u32,
}

/// Build the FCM message for a scheduled notification.
///
/// `payload` is the stored opaque mapping; it is flattened with
/// [`flatten_payload`] and the fixed `click_action` / `type` fields are
/// written last so they cannot be overridden by the client.
pub fn build_message(
    token: &str,
    title: &str,
    body: &str,
    payload: Option<&serde_json::Value>,
) -> PushMessage {
    let mut data = payload.map(flatten_payload).unwrap_or_default();
    data.insert("click_action".to_string(), CLICK_ACTION.to_string());
    data.insert("type".to_string(), MESSAGE_TYPE.to_string());

    PushMessage {
        token: token.to_string(),
        notification: NotificationBlock {
            title: title.to_string(),
            body: body.to_string(),
        },
        android: AndroidConfig {
            priority: "high",
            notification: AndroidNotification {
                sound: "default",
                channel_id: ANDROID_CHANNEL_ID,
                click_action: CLICK_ACTION,
            },
        },
        apns: ApnsConfig {
            payload: ApnsPayload {
                aps: Aps {
                    sound: "default",
                    content_available: 1,
                    badge: 1,
                },
            },
        },
        data,
    }
}

/// Flatten a JSON object into FCM's string-only data map.
///
/// Strings are copied verbatim; every other value is rendered as its JSON
/// text (`7`, `true`, `null`, `{"a":1}`). Non-object payloads flatten to an
/// empty map.
pub fn flatten_payload(payload: &serde_json::Value) -> BTreeMap<String, String> {
    let Some(object) = payload.as_object() else {
        return BTreeMap::new();
    };

    object
        .iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}
