// ── Runtime integration configuration ──
//
// These types describe one configured strip and its user options.
// They never touch disk: the CLI (or any host) builds an
// `IntegrationConfig` and hands it in.

use serde::{Deserialize, Serialize};

use crate::model::DeviceAddress;

/// User-adjustable options for one strip. Changing them never touches
/// the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripOptions {
    /// Ask the driver to correct colours for the strip's LED response.
    pub color_correction: bool,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            color_correction: true,
        }
    }
}

/// Configuration for one configured strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    pub address: DeviceAddress,
    /// Display title, used as the device name on every surface.
    pub title: String,
    #[serde(default)]
    pub options: StripOptions,
}

impl IntegrationConfig {
    /// A config titled after the address, with default options.
    pub fn new(address: DeviceAddress) -> Self {
        let title = default_title(&address);
        Self {
            address,
            title,
            options: StripOptions::default(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: StripOptions) -> Self {
        self.options = options;
        self
    }
}

/// `"LED Strip EEFF"` style title from the last two octets.
pub fn default_title(address: &DeviceAddress) -> String {
    let digits: Vec<char> = address.as_str().chars().filter(|c| *c != ':').collect();
    let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
    format!("LED Strip {tail}")
}
