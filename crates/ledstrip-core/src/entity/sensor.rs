// ── Sensor surfaces ──
//
// Read-only diagnostics, described by a static table. Adding a sensor is
// one more row.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::config::IntegrationConfig;
use crate::model::{DeviceAddress, Snapshot};
use crate::store::Observer;

use super::{EntityIdentity, entity_identity};

/// A rendered sensor value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Static description of one sensor.
#[derive(Debug)]
pub struct SensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub device_class: Option<&'static str>,
    /// Shown under diagnostics rather than as a primary control.
    pub diagnostic: bool,
    pub value_fn: fn(&Snapshot, &DeviceAddress) -> Option<SensorValue>,
}

pub static SENSORS: &[SensorDescription] = &[
    SensorDescription {
        key: "rssi",
        name: "Signal strength",
        unit: Some("dBm"),
        device_class: Some("signal_strength"),
        diagnostic: true,
        value_fn: rssi_value,
    },
    SensorDescription {
        key: "mac_address",
        name: "MAC address",
        unit: None,
        device_class: None,
        diagnostic: true,
        value_fn: address_value,
    },
];

fn rssi_value(snapshot: &Snapshot, _: &DeviceAddress) -> Option<SensorValue> {
    snapshot.rssi.map(|v| SensorValue::Integer(i64::from(v)))
}

fn address_value(_: &Snapshot, address: &DeviceAddress) -> Option<SensorValue> {
    Some(SensorValue::Text(address.to_string()))
}

pub fn find_description(key: &str) -> Option<&'static SensorDescription> {
    SENSORS.iter().find(|d| d.key == key)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorReading {
    pub version: u64,
    pub available: bool,
    pub value: Option<SensorValue>,
}

pub struct SensorEntity {
    description: &'static SensorDescription,
    identity: EntityIdentity,
    address: DeviceAddress,
    reading: ArcSwap<SensorReading>,
}

impl SensorEntity {
    pub fn new(
        config: &IntegrationConfig,
        description: &'static SensorDescription,
        initial: &Snapshot,
    ) -> Self {
        let reading = Self::read(description, &config.address, initial);
        Self {
            description,
            identity: entity_identity(config, description.key),
            address: config.address.clone(),
            reading: ArcSwap::from_pointee(reading),
        }
    }

    /// One entity per row of [`SENSORS`].
    pub fn all(config: &IntegrationConfig, initial: &Snapshot) -> Vec<Arc<Self>> {
        SENSORS
            .iter()
            .map(|d| Arc::new(Self::new(config, d, initial)))
            .collect()
    }

    pub fn description(&self) -> &'static SensorDescription {
        self.description
    }

    pub fn identity(&self) -> &EntityIdentity {
        &self.identity
    }

    pub fn reading(&self) -> Arc<SensorReading> {
        self.reading.load_full()
    }

    fn read(
        description: &SensorDescription,
        address: &DeviceAddress,
        snapshot: &Snapshot,
    ) -> SensorReading {
        SensorReading {
            version: snapshot.version,
            available: snapshot.is_available(),
            value: (description.value_fn)(snapshot, address),
        }
    }
}

impl Observer for SensorEntity {
    fn on_snapshot_updated(&self, snapshot: &Arc<Snapshot>) {
        let reading = Self::read(self.description, &self.address, snapshot);
        self.reading.store(Arc::new(reading));
    }
}
