//! In-memory fakes of the hub ports, with scripted failures.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use maxbridge_domain::device::{Device, DeviceBuilder, DeviceKind};
use maxbridge_domain::error::HubError;

use crate::ports::hub::{SharedDevice, read_device, share, write_device};
use crate::ports::{HubClient, HubConnector};

/// Builder for a thermostat device named after its serial.
pub fn thermostat(serial: &str) -> DeviceBuilder {
    Device::builder()
        .serial(serial)
        .name(format!("Room {serial}"))
        .kind(DeviceKind::Thermostat)
}

/// Scriptable hub client.
#[derive(Default)]
pub struct FakeHub {
    devices: Vec<SharedDevice>,
    staged: Mutex<Vec<Device>>,
    refresh_timeouts: AtomicU32,
    set_timeouts: AtomicU32,
    unreachable_target: Mutex<Option<f64>>,
    slow_target: Mutex<Option<(f64, Duration)>>,
    refresh_calls: AtomicUsize,
    set_calls: Mutex<Vec<(String, f64)>>,
}

impl FakeHub {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices: devices.into_iter().map(share).collect(),
            ..Self::default()
        }
    }

    /// Let the next `count` refreshes time out.
    pub fn with_refresh_timeouts(self, count: u32) -> Self {
        self.refresh_timeouts.store(count, Ordering::SeqCst);
        self
    }

    /// Let the next `count` set-point commands time out.
    pub fn with_set_timeouts(self, count: u32) -> Self {
        self.set_timeouts.store(count, Ordering::SeqCst);
        self
    }

    /// Let every command setting `temperature` time out.
    pub fn with_unreachable_target(self, temperature: f64) -> Self {
        *self
            .unreachable_target
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(temperature);
        self
    }

    /// Let every command setting `temperature` block for `delay` before
    /// succeeding.
    pub fn with_slow_target(self, temperature: f64, delay: Duration) -> Self {
        *self
            .slow_target
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some((temperature, delay));
        self
    }

    /// Make the next successful refresh report `device`.
    pub fn stage(&self, device: Device) {
        self.staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(device);
    }

    pub fn device(&self, serial: &str) -> SharedDevice {
        self.find(serial)
            .cloned()
            .expect("device should be known to the fake hub")
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> Vec<(String, f64)> {
        self.set_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn find(&self, serial: &str) -> Option<&SharedDevice> {
        self.devices
            .iter()
            .find(|device| read_device(device).serial == serial)
    }
}

impl HubClient for FakeHub {
    fn devices(&self) -> Vec<SharedDevice> {
        self.devices.clone()
    }

    fn refresh(&self) -> Result<(), HubError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.refresh_timeouts) {
            return Err(HubError::CommandTimeout { command: "refresh" });
        }
        let staged = std::mem::take(
            &mut *self.staged.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for snapshot in staged {
            if let Some(device) = self.find(&snapshot.serial) {
                *write_device(device) = snapshot;
            }
        }
        Ok(())
    }

    fn set_target_temperature(&self, serial: &str, temperature: f64) -> Result<(), HubError> {
        self.set_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((serial.to_string(), temperature));

        let unreachable = *self
            .unreachable_target
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if unreachable.is_some_and(|value| (value - temperature).abs() < f64::EPSILON)
            || Self::take_failure(&self.set_timeouts)
        {
            return Err(HubError::CommandTimeout {
                command: "set_temperature",
            });
        }

        let slow = *self
            .slow_target
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some((value, delay)) = slow
            && (value - temperature).abs() < f64::EPSILON
        {
            std::thread::sleep(delay);
        }

        let device = self.find(serial).ok_or_else(|| HubError::UnknownDevice {
            serial: serial.to_string(),
        })?;
        write_device(device).target_temperature = Some(temperature);
        Ok(())
    }
}

/// Connector handing out a prepared [`FakeHub`] once.
pub struct FakeConnector {
    hub: Mutex<Option<FakeHub>>,
}

impl FakeConnector {
    pub fn new(hub: FakeHub) -> Self {
        Self {
            hub: Mutex::new(Some(hub)),
        }
    }

    /// A connector whose hub never answers.
    pub fn unreachable() -> Self {
        Self {
            hub: Mutex::new(None),
        }
    }
}

impl HubConnector for FakeConnector {
    type Client = FakeHub;

    fn connect(&self, address: &str, port: u16) -> Result<FakeHub, HubError> {
        self.hub
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| HubError::ConnectionTimeout {
                address: address.to_string(),
                port,
            })
    }
}
