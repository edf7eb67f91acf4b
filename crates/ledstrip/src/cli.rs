//! Clap derive structures for the `ledstrip` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap + clap_complete so `build.rs` can include it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ledstrip -- drive a BLE LED strip coordinator from the command line
#[derive(Debug, Parser)]
#[command(
    name = "ledstrip",
    version,
    about = "Inspect and simulate BLE LED strip state coordination",
    long_about = "Tools around the ledstrip coordination core.\n\n\
        Converts effect codes and brightness values, manages strip profiles,\n\
        and runs scripted sessions against an in-memory strip.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Strip profile to use
    #[arg(long, short = 'p', env = "LEDSTRIP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (overrides the platform default location)
    #[arg(long, env = "LEDSTRIP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LEDSTRIP_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the named effects and their firmware codes
    #[command(alias = "fx")]
    Effects,

    /// Convert between firmware and presentation values
    #[command(alias = "conv")]
    Convert(ConvertArgs),

    /// Run a scripted session against an in-memory strip
    #[command(alias = "sim")]
    Simulate(SimulateArgs),

    /// Manage strip profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Convert ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[command(subcommand)]
    pub command: ConvertCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConvertCommand {
    /// Effect code <-> effect name
    Effect(EffectQuery),

    /// Native percentage <-> presentation brightness
    Brightness(BrightnessQuery),
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct EffectQuery {
    /// Firmware effect code to decode
    #[arg(long, allow_negative_numbers = true)]
    pub code: Option<i32>,

    /// Effect name to encode
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct BrightnessQuery {
    /// Native brightness percentage (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub native: Option<u8>,

    /// Presentation brightness (0-255)
    #[arg(long)]
    pub presentation: Option<u8>,
}

// ── Simulate ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Strip address (defaults to the active profile, then a demo address)
    #[arg(long, short = 'a')]
    pub address: Option<String>,

    /// Start with the strip out of range and sight it after setup
    #[arg(long)]
    pub absent: bool,

    /// Effect to request, in order (repeatable)
    #[arg(
        long = "effect",
        short = 'e',
        value_name = "NAME",
        default_values = ["fade_slow", "disco"]
    )]
    pub effects: Vec<String>,

    /// Presentation brightness for the first turn-on (0-255)
    #[arg(long, short = 'b', default_value = "128")]
    pub brightness: u8,

    /// Colour for the first turn-on (#rrggbb or r,g,b)
    #[arg(long, value_name = "COLOR")]
    pub rgb: Option<String>,

    /// Signal strength the strip reports once connected (dBm)
    #[arg(long, default_value = "-60", allow_negative_numbers = true)]
    pub rssi: i16,

    /// Disable colour correction for this session
    #[arg(long)]
    pub no_color_correction: bool,

    /// Delay the strip takes to disconnect on shutdown (ms)
    #[arg(long, default_value = "0")]
    pub disconnect_delay_ms: u64,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display current resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Add or replace a strip profile
    AddDevice {
        /// Profile name
        name: String,

        /// Strip BLE address (AA:BB:CC:DD:EE:FF)
        #[arg(long, short = 'a')]
        address: String,

        /// Display name (defaults to one derived from the address)
        #[arg(long)]
        title: Option<String>,

        /// Override colour correction for this strip
        #[arg(long)]
        color_correction: Option<bool>,

        /// Make this the default profile
        #[arg(long)]
        default: bool,
    },

    /// Set the default profile
    SetDefault {
        /// Profile name to set as default
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
