//! Alarm scheduling, cancellation, and reboot recovery against fake ports.

mod common;

use assert_matches::assert_matches;
use common::{TestDevice, MINUTE, NOW};
use planner_device::ports::AlarmMode;
use planner_device::scheduler::{RestoreReport, ScheduleOutcome, HEARTBEAT_ALARM_ID};
use planner_device::store::JsonFileStore;
use planner_device::{
    AlarmAction, AlarmRequest, AlarmStore, DeviceConfig, DeviceError, ExactAlarmFallback,
};

fn request(id: i64, fire_at: i64) -> AlarmRequest {
    AlarmRequest {
        id,
        fire_at_millis: fire_at,
        title: "Dentist".into(),
        body: "Appointment at 10:00".into(),
    }
}

#[test]
fn schedule_arms_exact_alarm_and_persists() {
    let device = TestDevice::new("Google");
    let scheduler = device.scheduler(DeviceConfig::default());

    let outcome = scheduler.schedule(&request(5, NOW + 30 * MINUTE)).unwrap();

    assert_eq!(outcome, ScheduleOutcome::Armed(AlarmMode::Exact));
    let armed = &device.alarms.armed()[&5];
    assert_eq!(armed.at, NOW + 30 * MINUTE);
    assert_eq!(armed.broadcast.action(), AlarmAction::Fire);
    assert_eq!(armed.broadcast.title.as_deref(), Some("Dentist"));
    assert_eq!(device.store.get(5).unwrap(), Some(NOW + 30 * MINUTE));
    assert!(!device.notifications.channels.lock().unwrap().is_empty());
}

#[test]
fn missing_permission_falls_back_to_inexact_by_default() {
    let device = TestDevice::new("Google");
    device.deny_exact_alarms();
    let scheduler = device.scheduler(DeviceConfig::default());

    let outcome = scheduler.schedule(&request(5, NOW + MINUTE)).unwrap();

    assert_eq!(outcome, ScheduleOutcome::Armed(AlarmMode::Inexact));
    assert_eq!(device.alarms.armed()[&5].mode, AlarmMode::Inexact);
    assert!(device.store.get(5).unwrap().is_some());
}

#[test]
fn skip_fallback_arms_and_stores_nothing() {
    let device = TestDevice::new("Google");
    device.deny_exact_alarms();
    let scheduler = device.scheduler(DeviceConfig {
        exact_alarm_fallback: ExactAlarmFallback::Skip,
        ..DeviceConfig::default()
    });

    let outcome = scheduler.schedule(&request(5, NOW + MINUTE)).unwrap();

    assert_eq!(outcome, ScheduleOutcome::Skipped);
    assert!(device.armed_ids().is_empty());
    assert_eq!(device.store.get(5).unwrap(), None);
}

#[test]
fn schedule_then_cancel_leaves_nothing() {
    let device = TestDevice::new("Google");
    let scheduler = device.scheduler(DeviceConfig::default());

    scheduler.schedule(&request(8, NOW + MINUTE)).unwrap();
    scheduler.cancel(8).unwrap();

    assert!(device.armed_ids().is_empty());
    assert!(device.store.all().unwrap().is_empty());
    assert_eq!(
        device.notifications.cancelled(),
        vec![8, 10_008, 20_008, 30_008, 40_008]
    );
}

#[test]
fn cancel_unknown_id_is_harmless() {
    let device = TestDevice::new("Google");
    let scheduler = device.scheduler(DeviceConfig::default());

    scheduler.schedule(&request(1, NOW + MINUTE)).unwrap();
    scheduler.cancel(99).unwrap();

    assert_eq!(device.armed_ids().into_iter().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn rescheduling_same_id_replaces_timer() {
    let device = TestDevice::new("Google");
    let scheduler = device.scheduler(DeviceConfig::default());

    scheduler.schedule(&request(3, NOW + MINUTE)).unwrap();
    scheduler.schedule(&request(3, NOW + 2 * MINUTE)).unwrap();

    assert_eq!(device.alarms.armed().len(), 1);
    assert_eq!(device.store.get(3).unwrap(), Some(NOW + 2 * MINUTE));
}

#[test]
fn restore_rearms_future_alarms_and_prunes_past_ones() {
    let device = TestDevice::new("Google");
    device.store.put(1, NOW + 10 * MINUTE).unwrap();
    device.store.put(2, NOW - MINUTE).unwrap();
    device.store.put(3, NOW + 60 * MINUTE).unwrap();
    let scheduler = device.scheduler(DeviceConfig::default());

    let report = scheduler.restore_all().unwrap();

    assert_eq!(
        report,
        RestoreReport {
            restored: 2,
            pruned: 1
        }
    );
    assert_eq!(
        device.armed_ids().into_iter().collect::<Vec<_>>(),
        vec![1, 3]
    );
    assert_eq!(device.store.get(2).unwrap(), None);
    assert_eq!(device.alarms.armed()[&1].broadcast.title, None);
}

#[test]
fn restore_reads_alarms_written_before_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alarms.json");

    {
        let device =
            TestDevice::with_store("Google", AlarmStore::new(JsonFileStore::open(&path).unwrap()));
        device
            .scheduler(DeviceConfig::default())
            .schedule(&request(42, NOW + 5 * MINUTE))
            .unwrap();
    }

    let rebooted =
        TestDevice::with_store("Google", AlarmStore::new(JsonFileStore::open(&path).unwrap()));
    let report = rebooted
        .scheduler(DeviceConfig::default())
        .restore_all()
        .unwrap();

    assert_eq!(report.restored, 1);
    assert_eq!(rebooted.alarms.armed()[&42].at, NOW + 5 * MINUTE);
}

#[test]
fn heartbeat_id_cannot_be_scheduled() {
    let device = TestDevice::new("Google");
    let scheduler = device.scheduler(DeviceConfig::default());

    let err = scheduler
        .schedule(&request(HEARTBEAT_ALARM_ID, NOW + MINUTE))
        .unwrap_err();

    assert_matches!(err, DeviceError::InvalidAlarmId(id) if id == HEARTBEAT_ALARM_ID);
    assert!(device.armed_ids().is_empty());
    assert!(device.store.all().unwrap().is_empty());
}

#[test]
fn cancel_at_the_top_of_the_id_range_does_not_overflow() {
    let device = TestDevice::new("Google");
    let scheduler = device.scheduler(DeviceConfig::default());

    scheduler.cancel(i64::MAX).unwrap();

    assert_eq!(device.notifications.cancelled(), vec![i64::MAX]);
}
