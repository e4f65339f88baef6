//! Accessory identity: what an exposed accessory says about itself.

use serde::{Deserialize, Serialize};

use crate::device::Device;

/// Manufacturer reported for every MAX! accessory.
pub const MAX_MANUFACTURER: &str = "e-Q3";
/// Model reported for radiator thermostats.
pub const THERMOSTAT_MODEL: &str = "MAX! Thermostat";
/// Model reported for the bridge (the Cube itself).
pub const CUBE_MODEL: &str = "MAX! Cube";

/// Accessory category tag, used by controllers to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Bridge = 2,
    Thermostat = 9,
}

impl Category {
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Static identity of an accessory (the `AccessoryInformation` service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryInfo {
    pub display_name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub category: Category,
}

impl AccessoryInfo {
    /// Identity of a thermostat accessory wrapping `device`.
    #[must_use]
    pub fn thermostat(device: &Device) -> Self {
        Self {
            display_name: device.display_name().to_string(),
            manufacturer: MAX_MANUFACTURER.to_string(),
            model: THERMOSTAT_MODEL.to_string(),
            serial_number: device.serial.clone(),
            category: Category::Thermostat,
        }
    }

    /// Identity of the bridge accessory.
    #[must_use]
    pub fn bridge(display_name: impl Into<String>, address: &str) -> Self {
        Self {
            display_name: display_name.into(),
            manufacturer: MAX_MANUFACTURER.to_string(),
            model: CUBE_MODEL.to_string(),
            serial_number: address.to_string(),
            category: Category::Bridge,
        }
    }
}
