//! Accessories: what the bridge exposes for each adapted device.
//!
//! An accessory is a characteristic table plus the behaviour bound to it.
//! Behaviour is attached explicitly: each live characteristic carries a
//! getter (a plain function of the device snapshot) and writable ones carry
//! a [`WriteAction`] naming the hub command a write turns into.

mod characteristics;
mod thermostat;

pub use characteristics::{CharacteristicEntry, CharacteristicTable, Getter, WriteAction};
pub use thermostat::Thermostat;
