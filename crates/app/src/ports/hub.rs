//! Hub port: the MAX! Cube as seen by the synchronization engine.
//!
//! The hub client owns the single connection to the Cube and the state of
//! every child device. Device state lives behind a [`SharedDevice`] handle
//! which the client refreshes in place; adapters keep a clone of the handle
//! and read through it, so they always see the latest refresh without any
//! extra synchronization channel.
//!
//! All methods except [`HubClient::devices`] may block on socket I/O. The
//! engine never calls them on the async scheduler directly; it goes through
//! [`run_blocking`](crate::runtime::run_blocking).

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use maxbridge_domain::device::Device;
use maxbridge_domain::error::HubError;

/// Hub-owned, in-place refreshed device state.
pub type SharedDevice = Arc<RwLock<Device>>;

/// Wrap a device into a fresh shared handle.
#[must_use]
pub fn share(device: Device) -> SharedDevice {
    Arc::new(RwLock::new(device))
}

/// Lock a shared device for reading.
///
/// A panic while a writer held the lock leaves the last written snapshot,
/// which is still a consistent device, so poisoning is ignored.
pub fn read_device(device: &SharedDevice) -> RwLockReadGuard<'_, Device> {
    device.read().unwrap_or_else(PoisonError::into_inner)
}

/// Lock a shared device for writing (hub clients only).
pub fn write_device(device: &SharedDevice) -> RwLockWriteGuard<'_, Device> {
    device.write().unwrap_or_else(PoisonError::into_inner)
}

/// Opens the connection to a hub.
pub trait HubConnector: Send + 'static {
    /// Client produced by a successful connection.
    type Client: HubClient;

    /// Connect to the hub and load its device list. Blocking.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ConnectionTimeout`] when the hub does not answer.
    fn connect(&self, address: &str, port: u16) -> Result<Self::Client, HubError>;
}

/// A connected hub.
///
/// Implementations must serialize access to the physical connection
/// themselves: the engine may issue a refresh while a command task is
/// sending a set-point.
pub trait HubClient: Send + Sync + 'static {
    /// Devices known to the hub. Non-blocking; returns the handles loaded at
    /// connection time.
    fn devices(&self) -> Vec<SharedDevice>;

    /// Pull the current state of every device from the hub and write it
    /// into the shared handles. Blocking.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::CommandTimeout`] when the hub does not answer.
    fn refresh(&self) -> Result<(), HubError>;

    /// Ask the hub to set the target temperature of the device with the
    /// given serial. Blocking.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::CommandTimeout`] when the hub does not answer,
    /// or [`HubError::UnknownDevice`] when the serial is not paired.
    fn set_target_temperature(&self, serial: &str, temperature: f64) -> Result<(), HubError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_share_device_state_between_handles() {
        let device = Device::builder().serial("KEQ0523864").build().unwrap();
        let hub_side = share(device);
        let adapter_side = Arc::clone(&hub_side);

        write_device(&hub_side).target_temperature = Some(22.5);

        assert_eq!(read_device(&adapter_side).target_temperature, Some(22.5));
    }
}
