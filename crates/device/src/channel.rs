//! Method-channel bridge between the app UI and the alarm layer.
//!
//! The UI calls by method name with a JSON argument map and receives a JSON
//! result, mirroring the host's platform channel contract.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::DeviceError;
use crate::permissions::Permissions;
use crate::scheduler::{AlarmRequest, AlarmScheduler, ScheduleOutcome};
use crate::vendor::VendorTable;
use crate::AlarmId;

/// Name the UI registers the channel under.
pub const CHANNEL_NAME: &str = "com.example.daily_planner/alarm";

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Method not implemented: {0}")]
    NotImplemented(String),

    #[error("Invalid arguments for {method}: {reason}")]
    InvalidArguments { method: String, reason: String },

    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl ChannelError {
    /// Error code reported back to the UI.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotImplemented(_) => "NOT_IMPLEMENTED",
            Self::InvalidArguments { .. } => "INVALID_ARGUMENTS",
            Self::Device(_) => "ERROR",
        }
    }
}

// Ids cross the channel as the host's 32-bit ints.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleArgs {
    id: i32,
    time_in_millis: i64,
    title: String,
    body: String,
}

#[derive(Debug, Deserialize)]
struct CancelArgs {
    id: i32,
}

/// Dispatches channel calls to the scheduler and permission helpers.
pub struct MethodChannel {
    scheduler: AlarmScheduler,
    permissions: Permissions,
    vendors: VendorTable,
}

impl MethodChannel {
    pub fn new(scheduler: AlarmScheduler, vendors: VendorTable) -> Self {
        let permissions = Permissions::new(scheduler.platform().clone());
        Self {
            scheduler,
            permissions,
            vendors,
        }
    }

    pub fn name(&self) -> &'static str {
        CHANNEL_NAME
    }

    /// Handle one call from the UI.
    pub fn invoke(&self, method: &str, args: &Value) -> Result<Value, ChannelError> {
        tracing::debug!(method, "Method channel call");

        let result = match method {
            "scheduleAlarm" => {
                let a: ScheduleArgs = parse_args(method, args)?;
                let outcome = self.scheduler.schedule(&AlarmRequest {
                    id: AlarmId::from(a.id),
                    fire_at_millis: a.time_in_millis,
                    title: a.title,
                    body: a.body,
                })?;
                json!(matches!(outcome, ScheduleOutcome::Armed(_)))
            }
            "cancelAlarm" => {
                let a: CancelArgs = parse_args(method, args)?;
                self.scheduler.cancel(AlarmId::from(a.id))?;
                json!(true)
            }
            "checkExactAlarmPermission" => json!(self.permissions.check_exact_alarm()),
            "requestExactAlarmPermission" => json!(self.permissions.request_exact_alarm()?),
            "checkBatteryOptimization" => json!(self.permissions.check_battery_optimization()),
            "requestBatteryOptimizationExemption" | "promptDisableBatteryOptimization" => {
                json!(self.permissions.request_battery_exemption()?.is_some())
            }
            "disableBatteryOptimization" => {
                json!(self.permissions.open_battery_optimization_list()?)
            }
            "getAndroidSdkVersion" => json!(self.permissions.sdk_version()),
            "openManufacturerSettings" | "openAutoStartSettings" => {
                self.permissions.open_manufacturer_settings(&self.vendors)?;
                Value::Null
            }
            "openAppSettings" => {
                self.permissions.open_app_settings()?;
                Value::Null
            }
            "ensureNotificationChannel" => {
                self.scheduler.ensure_channel();
                Value::Null
            }
            other => return Err(ChannelError::NotImplemented(other.to_string())),
        };
        Ok(result)
    }
}

fn parse_args<T: DeserializeOwned>(method: &str, args: &Value) -> Result<T, ChannelError> {
    T::deserialize(args).map_err(|e| ChannelError::InvalidArguments {
        method: method.to_string(),
        reason: e.to_string(),
    })
}
