//! Event: an immutable record of something observable that happened.
//!
//! Events are produced when an adapter pushes a new characteristic value
//! and when a user-initiated command finally reaches the hub.

use serde::{Deserialize, Serialize};

use crate::characteristic::{Characteristic, CharacteristicValue};
use crate::id::{CommandId, EventId};
use crate::time::{Timestamp, now};

/// A timestamped domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            timestamp: now(),
            kind,
        }
    }

    /// Serial of the accessory the event is about.
    #[must_use]
    pub fn serial(&self) -> &str {
        match &self.kind {
            EventKind::CharacteristicChanged { serial, .. }
            | EventKind::CommandDelivered { serial, .. } => serial,
        }
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// An adapter pushed a new value into one of its characteristics.
    CharacteristicChanged {
        serial: String,
        characteristic: Characteristic,
        value: CharacteristicValue,
    },
    /// A target-temperature command was accepted by the hub.
    CommandDelivered {
        serial: String,
        command_id: CommandId,
        target_temperature: f64,
        attempts: u32,
    },
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CharacteristicChanged {
                serial,
                characteristic,
                value,
            } => write!(f, "{serial}.{characteristic} = {value}"),
            Self::CommandDelivered {
                serial,
                target_temperature,
                attempts,
                ..
            } => write!(
                f,
                "{serial} target {target_temperature} delivered after {attempts} attempt(s)"
            ),
        }
    }
}
