//! Device: a MAX! child device as reported by the hub.
//!
//! The hub client owns device state and refreshes it in place. Everything
//! the bridge exposes is derived from a [`Device`] snapshot at read time;
//! nothing here is cached.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, ValidationError};
use crate::heating::HeatingCoolingState;

/// Kind of MAX! device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Cube,
    Thermostat,
    ThermostatPlus,
    WallThermostat,
    WindowShutter,
    EcoSwitch,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cube => f.write_str("cube"),
            Self::Thermostat => f.write_str("thermostat"),
            Self::ThermostatPlus => f.write_str("thermostat_plus"),
            Self::WallThermostat => f.write_str("wall_thermostat"),
            Self::WindowShutter => f.write_str("window_shutter"),
            Self::EcoSwitch => f.write_str("eco_switch"),
        }
    }
}

/// Operating mode of a thermostat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceMode {
    /// Follows the weekly program stored on the device.
    Automatic,
    /// Holds a manually set target.
    Manual,
}

/// Battery condition reported by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryStatus {
    Ok,
    Low,
}

/// A MAX! device and its last known state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub serial: String,
    pub name: String,
    pub kind: DeviceKind,
    pub actual_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub mode: Option<DeviceMode>,
    pub battery: Option<BatteryStatus>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] when `serial` is empty.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.serial.is_empty() {
            return Err(ValidationError::EmptySerial.into());
        }
        Ok(())
    }

    /// Only plain radiator thermostats are bridged.
    #[must_use]
    pub fn is_thermostat(&self) -> bool {
        self.kind == DeviceKind::Thermostat
    }

    /// Human-readable name, falling back to the serial for unnamed devices.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.serial
        } else {
            &self.name
        }
    }

    /// Measured temperature, else the target, else 0.
    ///
    /// MAX! thermostats only report a measurement after the valve moved, so
    /// the target is the best available estimate until then.
    #[must_use]
    pub fn current_temperature(&self) -> f64 {
        self.actual_temperature
            .or(self.target_temperature)
            .unwrap_or(0.0)
    }

    /// Target temperature, or 0 when unknown.
    #[must_use]
    pub fn target_temperature_or_default(&self) -> f64 {
        self.target_temperature.unwrap_or(0.0)
    }

    /// `Heat` while the room is below target, `Off` otherwise or when either
    /// temperature is unknown.
    #[must_use]
    pub fn current_heating_cooling_state(&self) -> HeatingCoolingState {
        match (self.actual_temperature, self.target_temperature) {
            (Some(actual), Some(target)) if actual < target => HeatingCoolingState::Heat,
            _ => HeatingCoolingState::Off,
        }
    }

    /// `Auto` when following the program (or mode unknown), `Off` otherwise.
    #[must_use]
    pub fn target_heating_cooling_state(&self) -> HeatingCoolingState {
        match self.mode {
            None | Some(DeviceMode::Automatic) => HeatingCoolingState::Auto,
            Some(DeviceMode::Manual) => HeatingCoolingState::Off,
        }
    }

    /// Battery level in percent: 100 when the battery is reported OK, else 0.
    #[must_use]
    pub fn battery_level(&self) -> u8 {
        if self.battery == Some(BatteryStatus::Ok) {
            100
        } else {
            0
        }
    }

    /// Whether the hub flagged the battery as low.
    #[must_use]
    pub fn is_battery_low(&self) -> bool {
        self.battery == Some(BatteryStatus::Low)
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    serial: Option<String>,
    name: Option<String>,
    kind: Option<DeviceKind>,
    actual_temperature: Option<f64>,
    target_temperature: Option<f64>,
    mode: Option<DeviceMode>,
    battery: Option<BatteryStatus>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: DeviceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn actual_temperature(mut self, temperature: f64) -> Self {
        self.actual_temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn target_temperature(mut self, temperature: f64) -> Self {
        self.target_temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: DeviceMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn battery(mut self, battery: BatteryStatus) -> Self {
        self.battery = Some(battery);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// The kind defaults to [`DeviceKind::Thermostat`].
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] if `serial` is missing or empty.
    pub fn build(self) -> Result<Device, BridgeError> {
        let device = Device {
            serial: self.serial.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            kind: self.kind.unwrap_or(DeviceKind::Thermostat),
            actual_temperature: self.actual_temperature,
            target_temperature: self.target_temperature,
            mode: self.mode,
            battery: self.battery,
        };
        device.validate()?;
        Ok(device)
    }
}
