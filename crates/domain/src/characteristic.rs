//! Services and characteristics exposed for each accessory.
//!
//! Characteristic names follow the accessory protocol's canonical names
//! (`CurrentTemperature`, `TargetHeatingCoolingState`, …). Every
//! characteristic this bridge exposes belongs to exactly one service, so a
//! [`Characteristic`] alone identifies an entry on an accessory.

use serde::{Deserialize, Serialize};

/// A service grouping related characteristics on an accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Service {
    AccessoryInformation,
    Thermostat,
    BatteryService,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessoryInformation => f.write_str("AccessoryInformation"),
            Self::Thermostat => f.write_str("Thermostat"),
            Self::BatteryService => f.write_str("BatteryService"),
        }
    }
}

/// A named, typed attribute of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Characteristic {
    Name,
    Manufacturer,
    Model,
    SerialNumber,
    CurrentTemperature,
    TargetTemperature,
    CurrentHeatingCoolingState,
    TargetHeatingCoolingState,
    TemperatureDisplayUnits,
    BatteryLevel,
    StatusLowBattery,
    ChargingState,
}

impl Characteristic {
    /// The service this characteristic is registered under.
    #[must_use]
    pub fn service(self) -> Service {
        match self {
            Self::Name | Self::Manufacturer | Self::Model | Self::SerialNumber => {
                Service::AccessoryInformation
            }
            Self::CurrentTemperature
            | Self::TargetTemperature
            | Self::CurrentHeatingCoolingState
            | Self::TargetHeatingCoolingState
            | Self::TemperatureDisplayUnits => Service::Thermostat,
            Self::BatteryLevel | Self::StatusLowBattery | Self::ChargingState => {
                Service::BatteryService
            }
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Manufacturer => "Manufacturer",
            Self::Model => "Model",
            Self::SerialNumber => "SerialNumber",
            Self::CurrentTemperature => "CurrentTemperature",
            Self::TargetTemperature => "TargetTemperature",
            Self::CurrentHeatingCoolingState => "CurrentHeatingCoolingState",
            Self::TargetHeatingCoolingState => "TargetHeatingCoolingState",
            Self::TemperatureDisplayUnits => "TemperatureDisplayUnits",
            Self::BatteryLevel => "BatteryLevel",
            Self::StatusLowBattery => "StatusLowBattery",
            Self::ChargingState => "ChargingState",
        }
    }
}

impl std::fmt::Display for Characteristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single characteristic value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl CharacteristicValue {
    /// Numeric view of the value, if it has one.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Bool(_) | Self::String(_) => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl std::fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<f64> for CharacteristicValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<u8> for CharacteristicValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for CharacteristicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for CharacteristicValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for CharacteristicValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Overrides of a characteristic's default metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacteristicProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<Vec<i64>>,
}

impl CharacteristicProperties {
    #[must_use]
    pub fn with_min_step(mut self, step: f64) -> Self {
        self.min_step = Some(step);
        self
    }

    #[must_use]
    pub fn with_valid_values(mut self, values: impl IntoIterator<Item = i64>) -> Self {
        self.valid_values = Some(values.into_iter().collect());
        self
    }

    /// Whether `value` satisfies the `valid_values` restriction (if any).
    #[must_use]
    pub fn accepts(&self, value: &CharacteristicValue) -> bool {
        match (&self.valid_values, value.as_i64()) {
            (None, _) => true,
            (Some(valid), Some(code)) => valid.contains(&code),
            (Some(_), None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_characteristics_to_services() {
        assert_eq!(
            Characteristic::SerialNumber.service(),
            Service::AccessoryInformation
        );
        assert_eq!(
            Characteristic::TargetTemperature.service(),
            Service::Thermostat
        );
        assert_eq!(
            Characteristic::StatusLowBattery.service(),
            Service::BatteryService
        );
    }

    #[test]
    fn should_display_protocol_name() {
        assert_eq!(
            Characteristic::CurrentHeatingCoolingState.to_string(),
            "CurrentHeatingCoolingState"
        );
    }

    #[test]
    fn should_serialize_value_as_json_scalar() {
        assert_eq!(
            serde_json::to_string(&CharacteristicValue::Float(21.5)).unwrap(),
            "21.5"
        );
        assert_eq!(
            serde_json::to_string(&CharacteristicValue::Int(3)).unwrap(),
            "3"
        );
        assert_eq!(
            serde_json::to_string(&CharacteristicValue::from("e-Q3")).unwrap(),
            "\"e-Q3\""
        );
    }

    #[test]
    fn should_read_integer_json_as_int_variant() {
        let value: CharacteristicValue = serde_json::from_str("22").unwrap();
        assert_eq!(value, CharacteristicValue::Int(22));
        assert_eq!(value.as_f64(), Some(22.0));
    }

    #[test]
    fn should_have_no_numeric_view_of_strings() {
        assert_eq!(CharacteristicValue::from("warm").as_f64(), None);
    }

    #[test]
    fn should_serialize_properties_in_camel_case() {
        let props = CharacteristicProperties::default()
            .with_min_step(0.5)
            .with_valid_values([0, 1]);
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json, serde_json::json!({ "minStep": 0.5, "validValues": [0, 1] }));
    }

    #[test]
    fn should_accept_only_valid_values() {
        let props = CharacteristicProperties::default().with_valid_values([0, 3]);
        assert!(props.accepts(&CharacteristicValue::Int(3)));
        assert!(!props.accepts(&CharacteristicValue::Int(1)));
        assert!(!props.accepts(&CharacteristicValue::Float(0.0)));
        assert!(CharacteristicProperties::default().accepts(&CharacteristicValue::Float(0.0)));
    }
}
