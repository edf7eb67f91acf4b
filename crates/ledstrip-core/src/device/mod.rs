// ── Device handle contract ──
//
// The BLE driver is external. The coordinator only needs a handle that can
// report its current belief, accept commands, and call back whenever that
// belief changes. Framing, GATT discovery, and radio retries live behind
// this trait.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{DeviceAddress, DeviceBelief, EffectCode, Rgb};

pub use memory::{FailurePoint, MemoryDevice};

/// Callback fired by a handle after its belief changed. Must be cheap and
/// must not block: the coordinator does its work synchronously inside it.
pub type ChangeListener = Arc<dyn Fn() + Send + Sync>;

/// Opaque registration ID returned by [`DeviceHandle::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Errors surfaced by a device driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("device is not connected")]
    NotConnected,

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("write failed: {0}")]
    Write(String),

    #[error("{operation} rejected by device: {reason}")]
    Rejected { operation: String, reason: String },

    #[error("{0}")]
    Other(String),
}

/// A live connection (or connection attempt) to one LED strip.
#[async_trait]
pub trait DeviceHandle: Send + Sync {
    /// Stable hardware address of the strip.
    fn address(&self) -> &DeviceAddress;

    /// A copy of the driver's current belief. Reading it has no side
    /// effects.
    fn current_belief(&self) -> DeviceBelief;

    async fn set_power(&self, on: bool) -> Result<(), DeviceError>;

    /// `percent` is native brightness, 0..=100.
    async fn set_brightness(&self, percent: u8) -> Result<(), DeviceError>;

    async fn set_color(&self, color: Rgb, color_correction: bool) -> Result<(), DeviceError>;

    async fn set_effect(&self, code: EffectCode) -> Result<(), DeviceError>;

    async fn disconnect(&self) -> Result<(), DeviceError>;

    /// Register a change callback. The handle invokes it after every
    /// belief change, possibly from any thread.
    fn subscribe(&self, listener: ChangeListener) -> ListenerId;

    fn unsubscribe(&self, id: ListenerId);
}
