//! Characteristic table: registered characteristics of one accessory.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use maxbridge_domain::characteristic::{
    Characteristic, CharacteristicProperties, CharacteristicValue, Service,
};
use maxbridge_domain::device::Device;

/// Computes a characteristic value from the current device snapshot.
pub type Getter = fn(&Device) -> CharacteristicValue;

/// Hub command a write to a characteristic is turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    SetTargetTemperature,
}

/// One registered characteristic.
///
/// `value` is the last value pushed to observers (or written by a
/// controller); the getter, when present, computes the live value.
#[derive(Debug, Clone)]
pub struct CharacteristicEntry {
    pub characteristic: Characteristic,
    pub value: CharacteristicValue,
    pub getter: Option<Getter>,
    pub setter: Option<WriteAction>,
    pub properties: CharacteristicProperties,
}

impl CharacteristicEntry {
    #[must_use]
    pub fn service(&self) -> Service {
        self.characteristic.service()
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub fn with_getter(&mut self, getter: Getter) -> &mut Self {
        self.getter = Some(getter);
        self
    }

    pub fn with_setter(&mut self, action: WriteAction) -> &mut Self {
        self.setter = Some(action);
        self
    }

    pub fn with_properties(&mut self, properties: CharacteristicProperties) -> &mut Self {
        self.properties = properties;
        self
    }
}

/// Characteristics of an accessory, keyed by characteristic.
#[derive(Debug, Clone, Default)]
pub struct CharacteristicTable {
    entries: BTreeMap<Characteristic, CharacteristicEntry>,
}

impl CharacteristicTable {
    /// Register `characteristic` with an initial value, replacing any
    /// previous registration. Returns the entry for further configuration.
    pub fn configure(
        &mut self,
        characteristic: Characteristic,
        value: impl Into<CharacteristicValue>,
    ) -> &mut CharacteristicEntry {
        let entry = CharacteristicEntry {
            characteristic,
            value: value.into(),
            getter: None,
            setter: None,
            properties: CharacteristicProperties::default(),
        };
        match self.entries.entry(characteristic) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(entry);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(entry),
        }
    }

    #[must_use]
    pub fn get(&self, characteristic: Characteristic) -> Option<&CharacteristicEntry> {
        self.entries.get(&characteristic)
    }

    /// Last pushed value.
    #[must_use]
    pub fn value(&self, characteristic: Characteristic) -> Option<&CharacteristicValue> {
        self.entries.get(&characteristic).map(|entry| &entry.value)
    }

    /// Live value: the getter applied to `device`, or the stored value for
    /// static characteristics.
    #[must_use]
    pub fn read(&self, characteristic: Characteristic, device: &Device) -> Option<CharacteristicValue> {
        self.entries
            .get(&characteristic)
            .map(|entry| match entry.getter {
                Some(getter) => getter(device),
                None => entry.value.clone(),
            })
    }

    /// Store a value written by a controller. Returns `false` if the
    /// characteristic is not registered.
    pub fn store(&mut self, characteristic: Characteristic, value: CharacteristicValue) -> bool {
        match self.entries.get_mut(&characteristic) {
            Some(entry) => {
                entry.value = value;
                true
            }
            None => false,
        }
    }

    /// Recompute every live characteristic from `device` and store the
    /// results. Returns the characteristics whose value changed.
    pub fn refresh(&mut self, device: &Device) -> Vec<(Characteristic, CharacteristicValue)> {
        let mut changed = Vec::new();
        for entry in self.entries.values_mut() {
            let Some(getter) = entry.getter else {
                continue;
            };
            let value = getter(device);
            if value != entry.value {
                entry.value = value.clone();
                changed.push((entry.characteristic, value));
            }
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharacteristicEntry> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
