// ── Device identity ──
//
// A BLE device is identified by its 48-bit address. Everything keyed per
// device (coordinator, entity unique IDs, config profiles) uses the
// normalized form produced here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string is not a six-octet BLE address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid BLE address '{input}': expected six hex octets like AA:BB:CC:DD:EE:FF")]
pub struct AddressParseError {
    pub input: String,
}

/// BLE device address, normalized to uppercase colon-separated format
/// (AA:BB:CC:DD:EE:FF).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceAddress(String);

impl DeviceAddress {
    /// Create a normalized address without validating it.
    /// Accepts colon-separated or dash-separated input in any case.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw.as_ref().trim().to_uppercase().replace('-', ":");
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the normalized form is six two-digit hex octets.
    pub fn is_well_formed(&self) -> bool {
        let octets: Vec<&str> = self.0.split(':').collect();
        octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeviceAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let addr = Self::new(s);
        if addr.is_well_formed() {
            Ok(addr)
        } else {
            Err(AddressParseError { input: s.into() })
        }
    }
}

impl TryFrom<String> for DeviceAddress {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceAddress> for String {
    fn from(addr: DeviceAddress) -> Self {
        addr.0
    }
}
