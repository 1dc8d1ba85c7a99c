//! Exact-alarm, battery-optimization, and settings-screen helpers.

use crate::error::DeviceError;
use crate::ports::{Platform, SettingsTarget};
use crate::vendor::VendorTable;

/// Permission checks and settings launches for the alarm layer.
#[derive(Clone)]
pub struct Permissions {
    platform: Platform,
}

impl Permissions {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    pub fn check_exact_alarm(&self) -> bool {
        self.platform.alarms.can_schedule_exact()
    }

    /// Open the exact-alarm request screen if the permission is missing.
    ///
    /// Returns whether a screen was opened.
    pub fn request_exact_alarm(&self) -> Result<bool, DeviceError> {
        if self.check_exact_alarm() {
            return Ok(false);
        }
        let target = SettingsTarget::ExactAlarmRequest;
        if !self.platform.settings.resolves(&target) {
            tracing::warn!("No activity handles the exact-alarm permission request");
            return Ok(false);
        }
        self.platform.settings.open(&target)?;
        Ok(true)
    }

    /// Whether the app is exempt from battery optimization.
    pub fn check_battery_optimization(&self) -> bool {
        self.platform.power.is_ignoring_battery_optimizations()
    }

    /// Ask for a battery-optimization exemption.
    ///
    /// Prefers the per-app prompt and falls back to the global list. Returns
    /// the screen opened, or `None` if already exempt.
    pub fn request_battery_exemption(&self) -> Result<Option<SettingsTarget>, DeviceError> {
        if self.check_battery_optimization() {
            tracing::info!("Already ignoring battery optimizations");
            return Ok(None);
        }
        self.open_first(&[
            SettingsTarget::BatteryOptimizationRequest,
            SettingsTarget::BatteryOptimizationList,
        ])
        .map(Some)
    }

    /// Open the global battery-optimization list unless already exempt.
    ///
    /// Returns whether the list was opened.
    pub fn open_battery_optimization_list(&self) -> Result<bool, DeviceError> {
        if self.check_battery_optimization() {
            tracing::info!("Already ignoring battery optimizations");
            return Ok(false);
        }
        self.platform
            .settings
            .open(&SettingsTarget::BatteryOptimizationList)?;
        Ok(true)
    }

    pub fn sdk_version(&self) -> u32 {
        self.platform.power.sdk_version()
    }

    /// Open the vendor's auto-start screen for this device.
    ///
    /// Falls back to the app details page and then to generic settings when
    /// the vendor screen does not exist on this build.
    pub fn open_manufacturer_settings(
        &self,
        vendors: &VendorTable,
    ) -> Result<SettingsTarget, DeviceError> {
        let preferred = vendors.lookup(&self.platform.manufacturer);
        tracing::debug!(manufacturer = %self.platform.manufacturer, ?preferred, "Opening manufacturer settings");
        self.open_first(&[
            preferred,
            SettingsTarget::AppDetails,
            SettingsTarget::Generic,
        ])
    }

    pub fn open_app_settings(&self) -> Result<(), DeviceError> {
        self.platform.settings.open(&SettingsTarget::AppDetails)
    }

    /// Open the first target that resolves; the last one is opened
    /// unconditionally if none do.
    fn open_first(&self, targets: &[SettingsTarget]) -> Result<SettingsTarget, DeviceError> {
        let chosen = targets
            .iter()
            .find(|t| self.platform.settings.resolves(t))
            .or(targets.last())
            .cloned()
            .unwrap_or(SettingsTarget::Generic);

        if Some(&chosen) != targets.first() {
            tracing::warn!(?chosen, "Preferred settings screen unavailable, using fallback");
        }
        self.platform.settings.open(&chosen)?;
        Ok(chosen)
    }
}
