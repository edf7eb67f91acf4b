//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ledstrip_config::ConfigError;
use ledstrip_core::{CoreError, DeviceError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Device ───────────────────────────────────────────────────────
    #[error("Strip {address} is not available")]
    #[diagnostic(
        code(ledstrip::unavailable),
        help("The strip is out of range, not yet sighted, or already stopped.")
    )]
    DeviceUnavailable { address: String },

    #[error("Command '{operation}' failed: {reason}")]
    #[diagnostic(code(ledstrip::command_failed))]
    CommandFailed { operation: String, reason: String },

    #[error("'{operation}' timed out after {timeout_ms}ms")]
    #[diagnostic(
        code(ledstrip::timeout),
        help("Move closer to the strip or check that nothing else holds the connection.")
    )]
    Timeout { operation: String, timeout_ms: u64 },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ledstrip::validation))]
    Validation { field: String, reason: String },

    #[error("Unknown effect '{name}'")]
    #[diagnostic(
        code(ledstrip::unknown_effect),
        help("Run: ledstrip effects to see the named effects")
    )]
    UnknownEffect { name: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ledstrip::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ledstrip config add-device <NAME> --address <ADDR>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No profile selected and no default profile configured")]
    #[diagnostic(
        code(ledstrip::no_profile),
        help(
            "Pass --profile, or set one with: ledstrip config set-default <NAME>\n\
             Config file: {path}"
        )
    )]
    NoProfile { path: String },

    #[error(transparent)]
    #[diagnostic(code(ledstrip::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(ledstrip::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    #[diagnostic(code(ledstrip::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DeviceUnavailable { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::UnknownEffect { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotAttached { address } | CoreError::ShutDown { address } => {
                CliError::DeviceUnavailable {
                    address: address.to_string(),
                }
            }

            CoreError::AddressMismatch { expected, actual } => CliError::Validation {
                field: "address".into(),
                reason: format!("strip {actual} does not match configured {expected}"),
            },

            CoreError::Command { operation, source } => match source {
                DeviceError::Timeout { timeout_ms, .. } => CliError::Timeout {
                    operation,
                    timeout_ms,
                },
                other => CliError::CommandFailed {
                    operation,
                    reason: other.to_string(),
                },
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(run: ledstrip config profiles)".into(),
            },
            ConfigError::NoProfile => CliError::NoProfile {
                path: ledstrip_config::config_path().display().to_string(),
            },
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: format!("failed to serialize config: {e}"),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
