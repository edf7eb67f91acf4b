//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use ledstrip_config::{Config, Profile};
use ledstrip_core::DeviceAddress;
use ledstrip_core::model::AddressParseError;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ProfileEntry {
    name: String,
    address: String,
    title: Option<String>,
    color_correction: bool,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Color correction")]
    color_correction: bool,
}

impl From<&ProfileEntry> for ProfileRow {
    fn from(p: &ProfileEntry) -> Self {
        Self {
            marker: if p.default { "*" } else { "" },
            name: p.name.clone(),
            address: p.address.clone(),
            title: p.title.clone().unwrap_or_default(),
            color_correction: p.color_correction,
        }
    }
}

fn profile_entries(cfg: &Config) -> Vec<ProfileEntry> {
    cfg.profiles
        .iter()
        .map(|(name, p)| ProfileEntry {
            name: name.clone(),
            address: p.address.clone(),
            title: p.name.clone(),
            color_correction: p.color_correction.unwrap_or(cfg.defaults.color_correction),
            default: cfg.default_profile.as_deref() == Some(name.as_str()),
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = config::config_path(global);
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config(global)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |c| c.default_profile.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config(global)?;
            if cfg.profiles.is_empty() {
                if !global.quiet {
                    eprintln!(
                        "No profiles configured. Run: ledstrip config add-device <NAME> --address <ADDR>"
                    );
                }
                return Ok(());
            }
            let entries = profile_entries(&cfg);
            let out = output::render_list(
                &global.output,
                &entries,
                |p| ProfileRow::from(p),
                |p| p.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── AddDevice ───────────────────────────────────────────────
        ConfigCommand::AddDevice {
            name,
            address,
            title,
            color_correction,
            default,
        } => {
            let parsed: DeviceAddress = address
                .parse()
                .map_err(|e: AddressParseError| CliError::Validation {
                    field: "address".into(),
                    reason: e.to_string(),
                })?;

            let mut cfg = config::load_config(global)?;
            let replaced = cfg
                .profiles
                .insert(
                    name.clone(),
                    Profile {
                        address: parsed.to_string(),
                        name: title,
                        color_correction,
                    },
                )
                .is_some();
            if default || cfg.default_profile.is_none() {
                cfg.default_profile = Some(name.clone());
            }
            config::save_config(global, &cfg)?;

            let verb = if replaced { "Updated" } else { "Added" };
            output::print_status(global, &format!("{verb} profile '{name}' ({parsed})"));
            Ok(())
        }

        // ── SetDefault <name> ───────────────────────────────────────
        ConfigCommand::SetDefault { name } => {
            let mut cfg = config::load_config(global)?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(global, &cfg)?;
            output::print_status(global, &format!("Default profile set to '{name}'"));
            Ok(())
        }
    }
}
