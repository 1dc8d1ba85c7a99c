//! Traits through which the alarm layer talks to the host OS.
//!
//! Each trait is a narrow slice of a platform service. Production bindings
//! wrap the OS APIs; tests use in-memory fakes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;
use crate::notification::{ChannelSpec, Notification};
use crate::receiver::AlarmBroadcast;
use crate::{AlarmId, EpochMillis};

/// How precisely the OS should honour an alarm's fire time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmMode {
    /// Wake-capable, fires at the requested instant even in idle mode.
    Exact,
    /// Wake-capable, but the OS may batch or defer delivery.
    Inexact,
}

/// The OS alarm service.
///
/// Alarms are keyed by id: setting an id that is already armed replaces the
/// previous timer.
pub trait AlarmClock: Send + Sync {
    /// Whether the user has granted the exact-alarm permission.
    fn can_schedule_exact(&self) -> bool;

    /// Arm a timer that delivers `broadcast` at `at`.
    fn set(
        &self,
        id: AlarmId,
        at: EpochMillis,
        mode: AlarmMode,
        broadcast: AlarmBroadcast,
    ) -> Result<(), DeviceError>;

    /// Disarm the timer for `id`. Unknown ids are not an error.
    fn cancel(&self, id: AlarmId) -> Result<(), DeviceError>;
}

/// The OS notification service.
pub trait NotificationSurface: Send + Sync {
    /// Create the channel if it does not exist. Idempotent.
    fn ensure_channel(&self, channel: &ChannelSpec) -> Result<(), DeviceError>;

    /// Post (or replace) the notification shown under `id`.
    fn show(&self, id: AlarmId, notification: &Notification) -> Result<(), DeviceError>;

    /// Remove the notification shown under `id`, if any.
    fn cancel(&self, id: AlarmId) -> Result<(), DeviceError>;
}

/// The OS power service.
pub trait PowerManager: Send + Sync {
    /// Whether the app is exempt from battery optimization.
    fn is_ignoring_battery_optimizations(&self) -> bool;

    /// OS API level of the running device.
    fn sdk_version(&self) -> u32;
}

/// A settings screen the app may ask the OS to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingsTarget {
    /// The "allow exact alarms" request screen.
    ExactAlarmRequest,
    /// The per-app "ignore battery optimizations" prompt.
    BatteryOptimizationRequest,
    /// The system-wide battery optimization list.
    BatteryOptimizationList,
    /// This app's details page.
    AppDetails,
    /// The top-level system settings.
    Generic,
    /// A vendor-specific activity.
    Component { package: String, class: String },
}

/// Launches settings screens.
pub trait SettingsLauncher: Send + Sync {
    /// Whether some activity on this device can handle `target`.
    fn resolves(&self, target: &SettingsTarget) -> bool;

    /// Open `target`.
    fn open(&self, target: &SettingsTarget) -> Result<(), DeviceError>;
}

/// Wall-clock source.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> EpochMillis;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> EpochMillis {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Every host service the alarm layer needs, bundled for sharing.
#[derive(Clone)]
pub struct Platform {
    pub alarms: Arc<dyn AlarmClock>,
    pub notifications: Arc<dyn NotificationSurface>,
    pub power: Arc<dyn PowerManager>,
    pub settings: Arc<dyn SettingsLauncher>,
    pub clock: Arc<dyn Clock>,
    /// Device manufacturer as reported by the OS (e.g. `Xiaomi`).
    pub manufacturer: String,
}
