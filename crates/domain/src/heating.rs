//! Enumerated characteristic values of the thermostat and battery services.
//!
//! The discriminants are the wire codes the accessory protocol uses.

use crate::characteristic::CharacteristicValue;

/// Heating/cooling state as exposed by `CurrentHeatingCoolingState` and
/// `TargetHeatingCoolingState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatingCoolingState {
    Off = 0,
    Heat = 1,
    Cool = 2,
    Auto = 3,
}

impl HeatingCoolingState {
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for HeatingCoolingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            Self::Heat => f.write_str("heat"),
            Self::Cool => f.write_str("cool"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

/// Unit the accessory displays temperatures in. MAX! devices are Celsius only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureDisplayUnits {
    #[default]
    Celsius = 0,
    Fahrenheit = 1,
}

impl TemperatureDisplayUnits {
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Charging state of the battery service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargingState {
    NotCharging = 0,
    Charging = 1,
    NotChargeable = 2,
}

impl ChargingState {
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<HeatingCoolingState> for CharacteristicValue {
    fn from(state: HeatingCoolingState) -> Self {
        Self::Int(i64::from(state.code()))
    }
}

impl From<TemperatureDisplayUnits> for CharacteristicValue {
    fn from(units: TemperatureDisplayUnits) -> Self {
        Self::Int(i64::from(units.code()))
    }
}

impl From<ChargingState> for CharacteristicValue {
    fn from(state: ChargingState) -> Self {
        Self::Int(i64::from(state.code()))
    }
}
