//! CLI-side configuration glue: `--config` / `--profile` aware wrappers
//! around `ledstrip-config`.
//!
//! Core never sees these types -- it receives a pre-built `IntegrationConfig`.

use std::path::PathBuf;

use ledstrip_config::{Config, ConfigError};
use ledstrip_core::IntegrationConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config` / `LEDSTRIP_CONFIG`, else the
/// platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(ledstrip_config::config_path)
}

pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(ledstrip_config::load_config_from(&config_path(global))?)
}

pub fn save_config(global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    Ok(ledstrip_config::save_config_to(cfg, &config_path(global))?)
}

/// Comma-separated profile names for help text.
pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Resolve the active profile into an `IntegrationConfig`.
///
/// Returns `Ok(None)` when no profile is selected at all, so callers can
/// fall back to flags.
pub fn resolve_integration(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<Option<IntegrationConfig>, CliError> {
    match cfg.profile(global.profile.as_deref()) {
        Ok((name, profile)) => {
            tracing::debug!(profile = name, address = %profile.address, "using profile");
            let resolved = ledstrip_config::profile_to_integration_config(profile, &cfg.defaults)?;
            Ok(Some(resolved))
        }
        Err(ConfigError::NoProfile) => Ok(None),
        Err(ConfigError::UnknownProfile { name }) => Err(CliError::ProfileNotFound {
            name,
            available: available_profiles(cfg),
        }),
        Err(other) => Err(other.into()),
    }
}
