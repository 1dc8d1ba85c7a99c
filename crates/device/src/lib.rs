//! On-device alarm layer for the daily planner.
//!
//! The host OS is reached only through the traits in [`ports`]; everything
//! else is plain Rust that can be driven from tests with in-memory fakes.
//!
//! - [`scheduler`] arms, cancels, and restores local alarms.
//! - [`receiver`] handles alarm broadcasts (fire, stop, snooze, reboot, keep-alive).
//! - [`permissions`] and [`vendor`] cover exact-alarm, battery, and auto-start settings.
//! - [`channel`] exposes all of the above to the app UI by method name.

pub mod channel;
pub mod config;
pub mod error;
pub mod notification;
pub mod permissions;
pub mod ports;
pub mod receiver;
pub mod scheduler;
pub mod store;
pub mod vendor;

pub use config::{DeviceConfig, ExactAlarmFallback};
pub use error::DeviceError;
pub use ports::Platform;
pub use receiver::{AlarmAction, AlarmBroadcast, AlarmReceiver};
pub use scheduler::{AlarmRequest, AlarmScheduler};
pub use store::AlarmStore;

/// Local alarm identifier. Derived identifiers (snooze, confirmations) are
/// computed by adding fixed offsets, so this is wider than the host's `int`.
pub type AlarmId = i64;

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;
