use serde::Deserialize;

use crate::error::DeviceError;

/// What to do when the user has not granted the exact-alarm permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExactAlarmFallback {
    /// Register an inexact, idle-allowed alarm instead.
    #[default]
    Inexact,
    /// Do not register anything; the alarm is dropped with a warning.
    Skip,
}

/// Tunables for the device alarm layer.
///
/// Every field has a default, so a partial JSON document (or `{}`) is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Delay applied by the snooze action (default: 5).
    pub snooze_minutes: u32,
    /// Period of the keep-alive heartbeat (default: 15).
    pub heartbeat_interval_minutes: u32,
    /// Policy when exact alarms are not permitted (default: inexact).
    pub exact_alarm_fallback: ExactAlarmFallback,
    /// Attach a full-screen intent to fired alarms (default: true).
    pub full_screen_intent: bool,
    /// Show a confirmation notification after snoozing (default: true).
    pub confirmations: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            snooze_minutes: 5,
            heartbeat_interval_minutes: 15,
            exact_alarm_fallback: ExactAlarmFallback::default(),
            full_screen_intent: true,
            confirmations: true,
        }
    }
}

impl DeviceConfig {
    /// Parse a configuration document, filling unset fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, DeviceError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn snooze_millis(&self) -> i64 {
        i64::from(self.snooze_minutes) * 60_000
    }

    pub fn heartbeat_millis(&self) -> i64 {
        i64::from(self.heartbeat_interval_minutes) * 60_000
    }
}
