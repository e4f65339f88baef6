//! The simulated cube and its connection.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use maxbridge_app::ports::hub::{SharedDevice, read_device, share, write_device};
use maxbridge_app::ports::{HubClient, HubConnector};
use maxbridge_domain::error::HubError;

use crate::config::VirtualCubeConfig;

/// Connector to a simulated MAX! Cube.
pub struct VirtualCube {
    config: VirtualCubeConfig,
    failed_connects: AtomicU32,
}

impl VirtualCube {
    #[must_use]
    pub fn new(config: VirtualCubeConfig) -> Self {
        Self {
            config,
            failed_connects: AtomicU32::new(0),
        }
    }
}

impl Default for VirtualCube {
    fn default() -> Self {
        Self::new(VirtualCubeConfig::default())
    }
}

impl HubConnector for VirtualCube {
    type Client = VirtualCubeClient;

    fn connect(&self, address: &str, port: u16) -> Result<VirtualCubeClient, HubError> {
        let failed = self
            .failed_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.config.connect_timeouts).then_some(n + 1)
            })
            .is_ok();
        if failed {
            tracing::debug!(address, port, "simulating connection timeout");
            return Err(HubError::ConnectionTimeout {
                address: address.to_string(),
                port,
            });
        }

        let mut devices = Vec::with_capacity(self.config.devices.len());
        for entry in &self.config.devices {
            match entry.to_device() {
                Ok(device) => devices.push(share(device)),
                Err(err) => tracing::warn!(%err, "skipping invalid virtual device"),
            }
        }

        tracing::info!(address, port, devices = devices.len(), "connected to virtual cube");
        Ok(VirtualCubeClient {
            devices,
            link: Mutex::new(Link::default()),
            timeout_every: self.config.timeout_every,
            drift_step: self.config.drift_step,
        })
    }
}

/// The single connection to the cube; commands go through it one at a time.
#[derive(Debug, Default)]
struct Link {
    commands: u32,
}

/// A connected virtual cube.
pub struct VirtualCubeClient {
    devices: Vec<SharedDevice>,
    link: Mutex<Link>,
    timeout_every: u32,
    drift_step: f64,
}

impl VirtualCubeClient {
    /// Take the link for one command, simulating a timeout on every n-th.
    fn command(&self, command: &'static str) -> Result<MutexGuard<'_, Link>, HubError> {
        let mut link = self.link.lock().unwrap_or_else(PoisonError::into_inner);
        link.commands = link.commands.wrapping_add(1);
        if self.timeout_every > 0 && link.commands % self.timeout_every == 0 {
            tracing::debug!(command, "simulating command timeout");
            return Err(HubError::CommandTimeout { command });
        }
        Ok(link)
    }
}

impl HubClient for VirtualCubeClient {
    fn devices(&self) -> Vec<SharedDevice> {
        self.devices.clone()
    }

    fn refresh(&self) -> Result<(), HubError> {
        let _link = self.command("refresh")?;
        for device in &self.devices {
            let mut device = write_device(device);
            if let (Some(actual), Some(target)) =
                (device.actual_temperature, device.target_temperature)
            {
                device.actual_temperature = Some(drift(actual, target, self.drift_step));
            }
        }
        Ok(())
    }

    fn set_target_temperature(&self, serial: &str, temperature: f64) -> Result<(), HubError> {
        let _link = self.command("set_temperature")?;
        let device = self
            .devices
            .iter()
            .find(|device| read_device(device).serial == serial)
            .ok_or_else(|| HubError::UnknownDevice {
                serial: serial.to_string(),
            })?;
        write_device(device).target_temperature = Some(temperature);
        tracing::debug!(serial, temperature, "virtual target temperature set");
        Ok(())
    }
}

/// Move `actual` by at most `step` towards `target`.
fn drift(actual: f64, target: f64, step: f64) -> f64 {
    let delta = target - actual;
    if delta.abs() <= step {
        target
    } else {
        actual + step.copysign(delta)
    }
}
