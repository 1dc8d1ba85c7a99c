#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use planner_device::notification::{ChannelSpec, Notification};
use planner_device::ports::{
    AlarmClock, AlarmMode, Clock, NotificationSurface, PowerManager, SettingsLauncher,
    SettingsTarget,
};
use planner_device::{
    AlarmBroadcast, AlarmId, AlarmScheduler, AlarmStore, DeviceConfig, DeviceError, EpochMillis,
    Platform,
};

pub const NOW: EpochMillis = 1_767_254_400_000;
pub const MINUTE: EpochMillis = 60_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ArmedAlarm {
    pub at: EpochMillis,
    pub mode: AlarmMode,
    pub broadcast: AlarmBroadcast,
}

#[derive(Default)]
pub struct FakeAlarmClock {
    pub exact_allowed: AtomicBool,
    pub armed: Mutex<BTreeMap<AlarmId, ArmedAlarm>>,
}

impl FakeAlarmClock {
    pub fn armed(&self) -> BTreeMap<AlarmId, ArmedAlarm> {
        self.armed.lock().unwrap().clone()
    }
}

impl AlarmClock for FakeAlarmClock {
    fn can_schedule_exact(&self) -> bool {
        self.exact_allowed.load(Ordering::SeqCst)
    }

    fn set(
        &self,
        id: AlarmId,
        at: EpochMillis,
        mode: AlarmMode,
        broadcast: AlarmBroadcast,
    ) -> Result<(), DeviceError> {
        self.armed
            .lock()
            .unwrap()
            .insert(id, ArmedAlarm { at, mode, broadcast });
        Ok(())
    }

    fn cancel(&self, id: AlarmId) -> Result<(), DeviceError> {
        self.armed.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeNotifications {
    pub channels: Mutex<Vec<&'static str>>,
    pub shown: Mutex<BTreeMap<AlarmId, Notification>>,
    pub cancelled: Mutex<Vec<AlarmId>>,
}

impl FakeNotifications {
    pub fn shown(&self) -> BTreeMap<AlarmId, Notification> {
        self.shown.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<AlarmId> {
        self.cancelled.lock().unwrap().clone()
    }
}

impl NotificationSurface for FakeNotifications {
    fn ensure_channel(&self, channel: &ChannelSpec) -> Result<(), DeviceError> {
        self.channels.lock().unwrap().push(channel.id);
        Ok(())
    }

    fn show(&self, id: AlarmId, notification: &Notification) -> Result<(), DeviceError> {
        self.shown.lock().unwrap().insert(id, notification.clone());
        Ok(())
    }

    fn cancel(&self, id: AlarmId) -> Result<(), DeviceError> {
        self.shown.lock().unwrap().remove(&id);
        self.cancelled.lock().unwrap().push(id);
        Ok(())
    }
}

pub const SDK_VERSION: u32 = 34;

pub struct FakePower {
    pub ignoring: AtomicBool,
    pub sdk: AtomicU32,
}

impl Default for FakePower {
    fn default() -> Self {
        Self {
            ignoring: AtomicBool::new(false),
            sdk: AtomicU32::new(SDK_VERSION),
        }
    }
}

impl PowerManager for FakePower {
    fn is_ignoring_battery_optimizations(&self) -> bool {
        self.ignoring.load(Ordering::SeqCst)
    }

    fn sdk_version(&self) -> u32 {
        self.sdk.load(Ordering::SeqCst)
    }
}

/// Resolves every target except those listed in `missing`.
#[derive(Default)]
pub struct FakeSettings {
    pub missing: Mutex<Vec<SettingsTarget>>,
    pub opened: Mutex<Vec<SettingsTarget>>,
}

impl FakeSettings {
    pub fn opened(&self) -> Vec<SettingsTarget> {
        self.opened.lock().unwrap().clone()
    }
}

impl SettingsLauncher for FakeSettings {
    fn resolves(&self, target: &SettingsTarget) -> bool {
        !self.missing.lock().unwrap().contains(target)
    }

    fn open(&self, target: &SettingsTarget) -> Result<(), DeviceError> {
        self.opened.lock().unwrap().push(target.clone());
        Ok(())
    }
}

pub struct FakeClock {
    pub now: AtomicI64,
}

impl FakeClock {
    pub fn advance(&self, millis: EpochMillis) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_millis(&self) -> EpochMillis {
        self.now.load(Ordering::SeqCst)
    }
}

/// A fake device with handles to every port.
pub struct TestDevice {
    pub alarms: Arc<FakeAlarmClock>,
    pub notifications: Arc<FakeNotifications>,
    pub power: Arc<FakePower>,
    pub settings: Arc<FakeSettings>,
    pub clock: Arc<FakeClock>,
    pub store: Arc<AlarmStore>,
    pub platform: Platform,
}

impl TestDevice {
    /// Exact alarms allowed, not battery-exempt, clock at [`NOW`].
    pub fn new(manufacturer: &str) -> Self {
        Self::with_store(manufacturer, AlarmStore::in_memory())
    }

    pub fn with_store(manufacturer: &str, store: AlarmStore) -> Self {
        let alarms = Arc::new(FakeAlarmClock::default());
        alarms.exact_allowed.store(true, Ordering::SeqCst);
        let notifications = Arc::new(FakeNotifications::default());
        let power = Arc::new(FakePower::default());
        let settings = Arc::new(FakeSettings::default());
        let clock = Arc::new(FakeClock {
            now: AtomicI64::new(NOW),
        });

        let platform = Platform {
            alarms: alarms.clone(),
            notifications: notifications.clone(),
            power: power.clone(),
            settings: settings.clone(),
            clock: clock.clone(),
            manufacturer: manufacturer.to_string(),
        };

        Self {
            alarms,
            notifications,
            power,
            settings,
            clock,
            store: Arc::new(store),
            platform,
        }
    }

    pub fn scheduler(&self, config: DeviceConfig) -> AlarmScheduler {
        AlarmScheduler::new(self.platform.clone(), self.store.clone(), config)
    }

    pub fn deny_exact_alarms(&self) {
        self.alarms.exact_allowed.store(false, Ordering::SeqCst);
    }

    pub fn armed_ids(&self) -> BTreeSet<AlarmId> {
        self.alarms.armed().into_keys().collect()
    }
}
