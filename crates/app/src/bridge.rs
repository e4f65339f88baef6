//! Bridge: the device directory and its refresh loop.
//!
//! The bridge connects to the hub once, adapts every thermostat it finds
//! and then refreshes the hub periodically until asked to stop. A refresh
//! that times out is skipped; the next cycle tries again. No hub failure
//! ends the loop.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use maxbridge_domain::accessory::AccessoryInfo;
use maxbridge_domain::characteristic::{Characteristic, CharacteristicValue};
use maxbridge_domain::error::{BridgeError, NotFoundError};
use maxbridge_domain::id::CommandId;

use crate::accessory::Thermostat;
use crate::ports::hub::read_device;
use crate::ports::{EventPublisher, HubClient, HubConnector};
use crate::runtime::{StopSignal, run_blocking};

/// Default address of the MAX! Cube.
pub const DEFAULT_ADDRESS: &str = "192.168.1.247";
/// Default TCP port of the MAX! Cube.
pub const DEFAULT_PORT: u16 = 62910;
/// Default time between two hub refreshes.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

/// Lifecycle of a [`Bridge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    Discovering,
    Running,
    Stopped,
}

impl std::fmt::Display for BridgeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("uninitialized"),
            Self::Discovering => f.write_str("discovering"),
            Self::Running => f.write_str("running"),
            Self::Stopped => f.write_str("stopped"),
        }
    }
}

/// Static settings of a [`Bridge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Display name of the bridge accessory.
    pub name: String,
    pub address: String,
    pub port: u16,
    pub update_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            name: "MaxBridge".to_string(),
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            update_interval: DEFAULT_UPDATE_INTERVAL,
        }
    }
}

/// Result of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The hub answered and every accessory was updated.
    Refreshed { accessories: usize, changed: usize },
    /// The hub refresh failed; nothing was pushed.
    Skipped,
    /// There is no hub connection to refresh.
    Disconnected,
}

/// Device directory: owns the hub connection and one adapter per
/// thermostat.
pub struct Bridge<H, P> {
    config: BridgeConfig,
    info: AccessoryInfo,
    hub: Option<Arc<H>>,
    accessories: BTreeMap<String, Arc<Thermostat<H, P>>>,
    publisher: P,
    state: watch::Sender<BridgeState>,
}

impl<H, P> Bridge<H, P>
where
    H: HubClient,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    /// Create a bridge that has not connected to the hub yet.
    pub fn new(config: BridgeConfig, publisher: P) -> Self {
        let info = AccessoryInfo::bridge(config.name.clone(), &config.address);
        let (state, _) = watch::channel(BridgeState::Uninitialized);
        Self {
            config,
            info,
            hub: None,
            accessories: BTreeMap::new(),
            publisher,
            state,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Identity of the bridge accessory itself.
    #[must_use]
    pub fn info(&self) -> &AccessoryInfo {
        &self.info
    }

    #[must_use]
    pub fn state(&self) -> BridgeState {
        *self.state.borrow()
    }

    /// Observe lifecycle transitions.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<BridgeState> {
        self.state.subscribe()
    }

    /// The connected hub client, once discovery succeeded.
    #[must_use]
    pub fn hub(&self) -> Option<&Arc<H>> {
        self.hub.as_ref()
    }

    #[must_use]
    pub fn accessory(&self, serial: &str) -> Option<Arc<Thermostat<H, P>>> {
        self.accessories.get(serial).cloned()
    }

    /// Adapted thermostats, ordered by serial.
    pub fn accessories(&self) -> impl Iterator<Item = &Arc<Thermostat<H, P>>> {
        self.accessories.values()
    }

    /// Read a characteristic of the accessory with the given serial.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] if no such accessory or
    /// characteristic exists.
    pub fn read(
        &self,
        serial: &str,
        characteristic: Characteristic,
    ) -> Result<CharacteristicValue, BridgeError> {
        self.find(serial)?.read(characteristic)
    }

    /// Write a characteristic of the accessory with the given serial.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] for an unknown accessory, or the
    /// accessory's own write error.
    pub fn write(
        &self,
        serial: &str,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<CommandId, BridgeError> {
        self.find(serial)?.write(characteristic, value)
    }

    /// Connect to the hub and adapt every thermostat it reports.
    ///
    /// Never fails: a hub that cannot be reached leaves the bridge running
    /// without accessories. Only the first call has an effect. Returns the
    /// number of adapted thermostats.
    #[tracing::instrument(
        skip(self, connector),
        fields(address = %self.config.address, port = self.config.port)
    )]
    pub async fn discover<C>(&mut self, connector: C) -> usize
    where
        C: HubConnector<Client = H>,
    {
        if self.state() != BridgeState::Uninitialized {
            tracing::warn!(state = %self.state(), "discovery already ran");
            return self.accessories.len();
        }
        self.state.send_replace(BridgeState::Discovering);

        let address = self.config.address.clone();
        let port = self.config.port;
        match run_blocking(move || connector.connect(&address, port)).await {
            Ok(client) => {
                let hub = Arc::new(client);
                let ignored = self.adopt(&hub);
                tracing::info!(ignored, "skipped devices that are not thermostats");
                self.hub = Some(hub);
            }
            Err(err) => {
                tracing::error!(%err, "could not connect to hub, exposing no accessories");
            }
        }

        self.state.send_replace(BridgeState::Running);
        tracing::info!(accessories = self.accessories.len(), "discovery finished");
        self.accessories.len()
    }

    /// Adapt the hub's thermostats and return how many devices were ignored.
    fn adopt(&mut self, hub: &Arc<H>) -> usize {
        let mut ignored = 0;
        for device in hub.devices() {
            let (serial, kind, supported) = {
                let snapshot = read_device(&device);
                (snapshot.serial.clone(), snapshot.kind, snapshot.is_thermostat())
            };
            if !supported {
                tracing::info!(%serial, %kind, "ignoring device that is not a thermostat");
                ignored += 1;
                continue;
            }

            match Thermostat::new(Arc::clone(hub), device, self.publisher.clone()) {
                Ok(thermostat) => {
                    tracing::info!(
                        %serial,
                        name = %thermostat.info().display_name,
                        "thermostat adopted"
                    );
                    self.accessories.insert(serial, Arc::new(thermostat));
                }
                Err(err) => tracing::warn!(%serial, %err, "failed to adapt thermostat"),
            }
        }
        ignored
    }

    /// Refresh periodically until `stop` fires.
    ///
    /// The stop signal is checked while waiting between cycles; a stop
    /// during the wait ends the loop without another refresh.
    pub async fn run(&self, mut stop: StopSignal) {
        if self.state() == BridgeState::Uninitialized {
            tracing::warn!("refresh loop started before discovery");
        }
        tracing::info!(
            interval_secs = self.config.update_interval.as_secs(),
            accessories = self.accessories.len(),
            "refresh loop started"
        );

        while !stop.wait_or_cancelled(self.config.update_interval).await {
            self.update().await;
        }

        self.state.send_replace(BridgeState::Stopped);
        tracing::info!("refresh loop stopped");
    }

    /// Run one refresh cycle: refresh the hub, then update every
    /// accessory from the new snapshot.
    #[tracing::instrument(skip(self))]
    pub async fn update(&self) -> CycleOutcome {
        let Some(hub) = self.hub.as_ref().map(Arc::clone) else {
            tracing::debug!("no hub connection, nothing to refresh");
            return CycleOutcome::Disconnected;
        };

        if let Err(err) = run_blocking(move || hub.refresh()).await {
            if err.is_timeout() {
                tracing::warn!(%err, "hub refresh timed out, skipping cycle");
            } else {
                tracing::error!(%err, "hub refresh failed, skipping cycle");
            }
            return CycleOutcome::Skipped;
        }

        let mut changed = 0;
        for accessory in self.accessories.values() {
            changed += accessory.update().await;
        }
        tracing::debug!(accessories = self.accessories.len(), changed, "refresh cycle finished");

        CycleOutcome::Refreshed {
            accessories: self.accessories.len(),
            changed,
        }
    }

    fn find(&self, serial: &str) -> Result<&Arc<Thermostat<H, P>>, BridgeError> {
        self.accessories.get(serial).ok_or_else(|| {
            NotFoundError {
                entity: "Accessory",
                id: serial.to_string(),
            }
            .into()
        })
    }
}
