//! Common error types used across the workspace.
//!
//! Each failure family is its own `thiserror` enum; [`BridgeError`] is the
//! umbrella type crossing port boundaries and converts from the others via
//! `#[from]`.

use crate::characteristic::{Characteristic, CharacteristicValue};
use crate::device::DeviceKind;

/// Umbrella error for the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A looked-up object does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The hub (or the link to it) failed.
    #[error(transparent)]
    Hub(#[from] HubError),

    /// An adapter was asked to wrap a device it cannot represent.
    #[error("device {serial} is not a thermostat (kind: {kind})")]
    InvalidDeviceKind { serial: String, kind: DeviceKind },

    /// A write targeted a characteristic without a setter.
    #[error("characteristic {0} is read-only")]
    ReadOnly(Characteristic),

    /// A write carried a value the characteristic cannot accept.
    #[error("invalid value {value} for characteristic {characteristic}")]
    InvalidValue {
        characteristic: Characteristic,
        value: CharacteristicValue,
    },

    /// A blocking job panicked or was cancelled before completing.
    #[error("background job failed")]
    Job(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BridgeError {
    /// Whether this error is a transient hub timeout worth retrying.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Hub(err) if err.is_timeout())
    }
}

/// Domain validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("serial must not be empty")]
    EmptySerial,
}

/// A named object could not be found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failures reported by the hub client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    /// The hub did not accept the connection in time.
    #[error("timed out connecting to hub at {address}:{port}")]
    ConnectionTimeout { address: String, port: u16 },

    /// The hub did not answer a command in time.
    #[error("hub command `{command}` timed out")]
    CommandTimeout { command: &'static str },

    /// The hub does not know the addressed device.
    #[error("hub has no device with serial {serial}")]
    UnknownDevice { serial: String },
}

impl HubError {
    /// Timeouts are transient; everything else is not.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::CommandTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_connection_timeout() {
        let err = HubError::ConnectionTimeout {
            address: "192.168.1.247".to_string(),
            port: 62910,
        };
        assert_eq!(
            err.to_string(),
            "timed out connecting to hub at 192.168.1.247:62910"
        );
    }

    #[test]
    fn should_display_command_timeout() {
        let err = HubError::CommandTimeout { command: "refresh" };
        assert_eq!(err.to_string(), "hub command `refresh` timed out");
    }

    #[test]
    fn should_treat_timeouts_as_transient() {
        assert!(HubError::CommandTimeout { command: "refresh" }.is_timeout());
        assert!(
            !HubError::UnknownDevice {
                serial: "KEQ0000001".to_string()
            }
            .is_timeout()
        );
    }

    #[test]
    fn should_convert_hub_error_into_bridge_error() {
        let err: BridgeError = HubError::CommandTimeout { command: "set_temperature" }.into();
        assert!(matches!(err, BridgeError::Hub(_)));
        assert!(err.is_timeout());
    }

    #[test]
    fn should_not_treat_validation_error_as_timeout() {
        let err: BridgeError = ValidationError::EmptySerial.into();
        assert!(!err.is_timeout());
    }

    #[test]
    fn should_display_not_found_error() {
        let err = NotFoundError {
            entity: "Accessory",
            id: "KEQ0000001".to_string(),
        };
        assert_eq!(err.to_string(), "Accessory KEQ0000001 not found");
    }

    #[test]
    fn should_display_invalid_device_kind() {
        let err = BridgeError::InvalidDeviceKind {
            serial: "KEQ0000002".to_string(),
            kind: DeviceKind::WindowShutter,
        };
        assert_eq!(
            err.to_string(),
            "device KEQ0000002 is not a thermostat (kind: window_shutter)"
        );
    }
}
