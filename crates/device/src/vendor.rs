//! Manufacturer-specific auto-start / background settings screens.
//!
//! Several vendors kill background alarms unless the user allow-lists the
//! app in a custom settings activity. The mapping lives in JSON so new
//! vendors can be added without code changes.

use std::path::Path;

use serde::Deserialize;

use crate::error::DeviceError;
use crate::ports::SettingsTarget;

const EMBEDDED: &str = include_str!("../config/vendor_settings.json");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VendorEntry {
    /// Lower-case substring matched against the device manufacturer.
    pub manufacturer: String,
    pub target: SettingsTarget,
}

/// Ordered manufacturer-to-settings table. First match wins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VendorTable {
    pub vendors: Vec<VendorEntry>,
}

impl VendorTable {
    pub fn from_json(json: &str) -> Result<Self, DeviceError> {
        let mut table: Self = serde_json::from_str(json)?;
        for entry in &mut table.vendors {
            entry.manufacturer = entry.manufacturer.to_lowercase();
        }
        Ok(table)
    }

    /// Load a table from disk, replacing the embedded one.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// The table shipped with the crate.
    pub fn embedded() -> Result<Self, DeviceError> {
        Self::from_json(EMBEDDED)
    }

    /// Settings target for `manufacturer`, or [`SettingsTarget::Generic`]
    /// when no entry matches. Matching is a case-insensitive substring test.
    pub fn lookup(&self, manufacturer: &str) -> SettingsTarget {
        let manufacturer = manufacturer.to_lowercase();
        self.vendors
            .iter()
            .find(|entry| manufacturer.contains(&entry.manufacturer))
            .map(|entry| entry.target.clone())
            .unwrap_or(SettingsTarget::Generic)
    }
}
