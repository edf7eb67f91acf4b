// ── Core error types ──
//
// User-facing errors from ledstrip-core. Driver failures arrive as
// `DeviceError` and are wrapped with the operation that triggered them.
// Unknown device state is never an error; it is `None` in the snapshot.

use thiserror::Error;

use crate::device::DeviceError;
use crate::model::DeviceAddress;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("No device attached for {address}")]
    NotAttached { address: DeviceAddress },

    #[error("Device {actual} does not belong to coordinator for {expected}")]
    AddressMismatch {
        expected: DeviceAddress,
        actual: DeviceAddress,
    },

    #[error("Coordinator for {address} has shut down")]
    ShutDown { address: DeviceAddress },

    // ── Command errors ───────────────────────────────────────────────
    #[error("Device command {operation} failed: {source}")]
    Command {
        operation: String,
        #[source]
        source: DeviceError,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}
