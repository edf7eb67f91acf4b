//! Shared configuration for the ledstrip tools.
//!
//! TOML device profiles with environment overrides, and translation to
//! `ledstrip_core::IntegrationConfig`. The CLI adds `GlobalOpts`-aware
//! wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use ledstrip_core::config::default_title;
use ledstrip_core::model::AddressParseError;
use ledstrip_core::{DeviceAddress, IntegrationConfig, StripOptions};

/// Environment variable prefix; nested keys use `__`
/// (`LEDSTRIP_DEFAULTS__COLOR_CORRECTION=false`).
pub const ENV_PREFIX: &str = "LEDSTRIP_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no profile selected and no default profile configured")]
    NoProfile,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is given on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named strip profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color_correction")]
    pub color_correction: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color_correction: default_color_correction(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color_correction() -> bool {
    true
}

/// A named strip.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// BLE address (AA:BB:CC:DD:EE:FF).
    pub address: String,

    /// Display name; defaults to one derived from the address.
    pub name: Option<String>,

    /// Override the global colour-correction default.
    pub color_correction: Option<bool>,
}

impl Config {
    /// Resolve the profile to use: the explicit name, else the default.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .ok_or(ConfigError::NoProfile)?;
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "ledstrip", "ledstrip").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ledstrip");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from `path` + environment. A missing file is
/// not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent
/// directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── Translation to core config ──────────────────────────────────────

/// Build an `IntegrationConfig` from a profile. Validates the address;
/// the profile's colour-correction override wins over `defaults`.
pub fn profile_to_integration_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<IntegrationConfig, ConfigError> {
    let address: DeviceAddress =
        profile
            .address
            .parse()
            .map_err(|e: AddressParseError| ConfigError::Validation {
                field: "address".into(),
                reason: e.to_string(),
            })?;

    let title = profile
        .name
        .clone()
        .unwrap_or_else(|| default_title(&address));

    let options = StripOptions {
        color_correction: profile
            .color_correction
            .unwrap_or(defaults.color_correction),
    };

    Ok(IntegrationConfig {
        address,
        title,
        options,
    })
}
