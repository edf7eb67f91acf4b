// ── Display surfaces ──
//
// Surfaces are independent observers of one coordinator. Each one keeps
// its own rendered view, swapped atomically on every snapshot, and shares
// the identity metadata built here.

pub mod light;
pub mod sensor;

use serde::Serialize;

use crate::config::IntegrationConfig;
use crate::model::DeviceAddress;

pub use light::{LIGHT_KEY, LightEntity, LightView};
pub use sensor::{SENSORS, SensorDescription, SensorEntity, SensorReading, SensorValue};

/// Integration domain used in device identifiers.
pub const DOMAIN: &str = "daybetter_led";

pub const MANUFACTURER: &str = "Daybetter";

/// Host device-registry entry shared by every surface of one strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// `(domain, address)` pairs.
    pub identifiers: Vec<(String, String)>,
    pub manufacturer: String,
    pub name: String,
}

/// Stable identity of one surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityIdentity {
    /// `"{address}_{key}"`, unique across all strips.
    pub unique_id: String,
    pub key: &'static str,
    pub device: DeviceInfo,
}

pub fn device_info(config: &IntegrationConfig) -> DeviceInfo {
    DeviceInfo {
        identifiers: vec![(DOMAIN.to_owned(), config.address.to_string())],
        manufacturer: MANUFACTURER.to_owned(),
        name: config.title.clone(),
    }
}

pub fn unique_id(address: &DeviceAddress, key: &str) -> String {
    format!("{address}_{key}")
}

/// Identity for the surface `key` of the configured strip.
pub fn entity_identity(config: &IntegrationConfig, key: &'static str) -> EntityIdentity {
    EntityIdentity {
        unique_id: unique_id(&config.address, key),
        key,
        device: device_info(config),
    }
}
