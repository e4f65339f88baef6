//! Configuration of the virtual cube.

use serde::Deserialize;

use maxbridge_domain::device::{BatteryStatus, Device, DeviceKind, DeviceMode};
use maxbridge_domain::error::BridgeError;

/// Devices and failure behaviour of a [`VirtualCube`](crate::VirtualCube).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VirtualCubeConfig {
    /// Devices paired with the cube.
    pub devices: Vec<VirtualDeviceConfig>,
    /// Number of connection attempts that time out before one succeeds.
    pub connect_timeouts: u32,
    /// Every n-th hub command times out. `0` disables simulated timeouts.
    pub timeout_every: u32,
    /// Degrees the actual temperature moves towards the target per refresh.
    pub drift_step: f64,
}

impl Default for VirtualCubeConfig {
    fn default() -> Self {
        Self {
            devices: vec![
                VirtualDeviceConfig::thermostat("KEQ0000001", "Living Room", 19.5, 21.0),
                VirtualDeviceConfig::thermostat("KEQ0000002", "Bedroom", 18.0, 17.0),
                VirtualDeviceConfig {
                    serial: "KEQ0000003".to_string(),
                    name: "Living Room Window".to_string(),
                    kind: DeviceKind::WindowShutter,
                    ..VirtualDeviceConfig::default()
                },
            ],
            connect_timeouts: 0,
            timeout_every: 0,
            drift_step: 0.5,
        }
    }
}

/// Initial state of one simulated device.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VirtualDeviceConfig {
    pub serial: String,
    pub name: String,
    pub kind: DeviceKind,
    pub actual_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub mode: Option<DeviceMode>,
    pub battery: Option<BatteryStatus>,
}

impl Default for VirtualDeviceConfig {
    fn default() -> Self {
        Self {
            serial: String::new(),
            name: String::new(),
            kind: DeviceKind::Thermostat,
            actual_temperature: None,
            target_temperature: None,
            mode: None,
            battery: None,
        }
    }
}

impl VirtualDeviceConfig {
    /// A thermostat in automatic mode with a healthy battery.
    #[must_use]
    pub fn thermostat(serial: &str, name: &str, actual: f64, target: f64) -> Self {
        Self {
            serial: serial.to_string(),
            name: name.to_string(),
            kind: DeviceKind::Thermostat,
            actual_temperature: Some(actual),
            target_temperature: Some(target),
            mode: Some(DeviceMode::Automatic),
            battery: Some(BatteryStatus::Ok),
        }
    }

    /// Build the device this entry describes.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] if the serial is empty.
    pub fn to_device(&self) -> Result<Device, BridgeError> {
        let mut builder = Device::builder()
            .serial(self.serial.clone())
            .name(self.name.clone())
            .kind(self.kind);
        if let Some(actual) = self.actual_temperature {
            builder = builder.actual_temperature(actual);
        }
        if let Some(target) = self.target_temperature {
            builder = builder.target_temperature(target);
        }
        if let Some(mode) = self.mode {
            builder = builder.mode(mode);
        }
        if let Some(battery) = self.battery {
            builder = builder.battery(battery);
        }
        builder.build()
    }
}
