//! Thermostat adapter: one radiator thermostat exposed as an accessory.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use maxbridge_domain::accessory::AccessoryInfo;
use maxbridge_domain::characteristic::{
    Characteristic, CharacteristicProperties, CharacteristicValue,
};
use maxbridge_domain::device::Device;
use maxbridge_domain::error::{BridgeError, NotFoundError};
use maxbridge_domain::event::{Event, EventKind};
use maxbridge_domain::heating::{ChargingState, TemperatureDisplayUnits};
use maxbridge_domain::id::CommandId;

use super::characteristics::{CharacteristicEntry, CharacteristicTable, WriteAction};
use crate::command::CommandDispatcher;
use crate::ports::hub::read_device;
use crate::ports::{EventPublisher, HubClient, SharedDevice};

/// Resolution of both temperature characteristics, in °C.
pub const TEMPERATURE_STEP: f64 = 0.5;

/// Synchronization unit for a single thermostat.
///
/// Reads go straight through the shared device handle; [`update`] pushes
/// the values recomputed after a hub refresh; writes to the target
/// temperature become hub commands delivered in the background.
///
/// [`update`]: Thermostat::update
pub struct Thermostat<H, P> {
    info: AccessoryInfo,
    device: SharedDevice,
    characteristics: Mutex<CharacteristicTable>,
    commands: CommandDispatcher<H, P>,
    publisher: P,
}

impl<H, P> Thermostat<H, P>
where
    H: HubClient,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    /// Adapt `device`, sending commands through `hub`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidDeviceKind`] if the device is not a
    /// radiator thermostat.
    pub fn new(hub: Arc<H>, device: SharedDevice, publisher: P) -> Result<Self, BridgeError> {
        let (info, characteristics) = {
            let snapshot = read_device(&device);
            if !snapshot.is_thermostat() {
                return Err(BridgeError::InvalidDeviceKind {
                    serial: snapshot.serial.clone(),
                    kind: snapshot.kind,
                });
            }
            let info = AccessoryInfo::thermostat(&snapshot);
            let table = characteristic_table(&info, &snapshot);
            (info, table)
        };

        let commands =
            CommandDispatcher::new(hub, info.serial_number.clone(), publisher.clone());

        Ok(Self {
            info,
            device,
            characteristics: Mutex::new(characteristics),
            commands,
            publisher,
        })
    }

    #[must_use]
    pub fn serial(&self) -> &str {
        &self.info.serial_number
    }

    #[must_use]
    pub fn info(&self) -> &AccessoryInfo {
        &self.info
    }

    /// Current value of a characteristic, computed from the latest device
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] if the characteristic is not
    /// registered on this accessory.
    pub fn read(&self, characteristic: Characteristic) -> Result<CharacteristicValue, BridgeError> {
        let table = self.table();
        let device = read_device(&self.device);
        table
            .read(characteristic, &device)
            .ok_or_else(|| self.not_found(characteristic))
    }

    /// Value last pushed to observers.
    #[must_use]
    pub fn value(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        self.table().value(characteristic).cloned()
    }

    /// Handle a controller write.
    ///
    /// Returns as soon as the resulting hub command is scheduled; delivery
    /// is reported later through a `CommandDelivered` event.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] for an unregistered characteristic,
    /// [`BridgeError::ReadOnly`] if it has no setter, or
    /// [`BridgeError::InvalidValue`] if the value cannot be applied.
    #[tracing::instrument(skip(self), fields(serial = %self.info.serial_number))]
    pub fn write(
        &self,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<CommandId, BridgeError> {
        let mut table = self.table();
        let (setter, accepted) = {
            let entry = table
                .get(characteristic)
                .ok_or_else(|| self.not_found(characteristic))?;
            (entry.setter, entry.properties.accepts(&value))
        };
        let Some(action) = setter else {
            return Err(BridgeError::ReadOnly(characteristic));
        };
        if !accepted {
            return Err(BridgeError::InvalidValue {
                characteristic,
                value,
            });
        }

        match action {
            WriteAction::SetTargetTemperature => {
                let Some(temperature) = value.as_f64().filter(|t| t.is_finite()) else {
                    return Err(BridgeError::InvalidValue {
                        characteristic,
                        value,
                    });
                };
                table.store(characteristic, CharacteristicValue::Float(temperature));
                drop(table);

                let id = self.commands.dispatch(temperature);
                tracing::info!(temperature, command_id = %id, "target temperature command scheduled");
                Ok(id)
            }
        }
    }

    /// Push freshly computed values into every live characteristic and
    /// publish the ones that changed. Returns the number of changes.
    #[tracing::instrument(skip(self), fields(serial = %self.info.serial_number))]
    pub async fn update(&self) -> usize {
        let changed = {
            let mut table = self.table();
            let device = read_device(&self.device);
            table.refresh(&device)
        };

        let count = changed.len();
        for (characteristic, value) in changed {
            tracing::debug!(%characteristic, %value, "characteristic changed");
            let event = Event::new(EventKind::CharacteristicChanged {
                serial: self.info.serial_number.clone(),
                characteristic,
                value,
            });
            if let Err(err) = self.publisher.publish(event).await {
                tracing::warn!(%characteristic, %err, "failed to publish characteristic change");
            }
        }
        count
    }

    /// Registered characteristics, ordered by service.
    #[must_use]
    pub fn characteristics(&self) -> Vec<CharacteristicEntry> {
        self.table().iter().cloned().collect()
    }

    /// Target temperature command still being delivered, if any.
    #[must_use]
    pub fn pending_command(&self) -> Option<CommandId> {
        self.commands.pending()
    }

    fn table(&self) -> MutexGuard<'_, CharacteristicTable> {
        self.characteristics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn not_found(&self, characteristic: Characteristic) -> BridgeError {
        NotFoundError {
            entity: "Characteristic",
            id: format!("{}/{characteristic}", self.info.serial_number),
        }
        .into()
    }
}

fn characteristic_table(info: &AccessoryInfo, device: &Device) -> CharacteristicTable {
    let temperature = CharacteristicProperties::default().with_min_step(TEMPERATURE_STEP);
    let mut table = CharacteristicTable::default();

    table.configure(Characteristic::Name, info.display_name.as_str());
    table.configure(Characteristic::Manufacturer, info.manufacturer.as_str());
    table.configure(Characteristic::Model, info.model.as_str());
    table.configure(Characteristic::SerialNumber, info.serial_number.as_str());

    table
        .configure(Characteristic::CurrentTemperature, current_temperature(device))
        .with_getter(current_temperature)
        .with_properties(temperature.clone());
    table
        .configure(Characteristic::TargetTemperature, target_temperature(device))
        .with_getter(target_temperature)
        .with_setter(WriteAction::SetTargetTemperature)
        .with_properties(temperature);
    table
        .configure(
            Characteristic::CurrentHeatingCoolingState,
            current_heating_cooling_state(device),
        )
        .with_getter(current_heating_cooling_state)
        .with_properties(CharacteristicProperties::default().with_valid_values([0, 1]));
    table
        .configure(
            Characteristic::TargetHeatingCoolingState,
            target_heating_cooling_state(device),
        )
        .with_getter(target_heating_cooling_state)
        .with_properties(CharacteristicProperties::default().with_valid_values([0, 3]));
    table.configure(
        Characteristic::TemperatureDisplayUnits,
        TemperatureDisplayUnits::Celsius,
    );

    table
        .configure(Characteristic::BatteryLevel, battery_level(device))
        .with_getter(battery_level);
    table
        .configure(Characteristic::StatusLowBattery, status_low_battery(device))
        .with_getter(status_low_battery);
    table.configure(Characteristic::ChargingState, ChargingState::NotChargeable);

    table
}

fn current_temperature(device: &Device) -> CharacteristicValue {
    device.current_temperature().into()
}

fn target_temperature(device: &Device) -> CharacteristicValue {
    device.target_temperature_or_default().into()
}

fn current_heating_cooling_state(device: &Device) -> CharacteristicValue {
    device.current_heating_cooling_state().into()
}

fn target_heating_cooling_state(device: &Device) -> CharacteristicValue {
    device.target_heating_cooling_state().into()
}

fn battery_level(device: &Device) -> CharacteristicValue {
    device.battery_level().into()
}

fn status_low_battery(device: &Device) -> CharacteristicValue {
    u8::from(device.is_battery_low()).into()
}
