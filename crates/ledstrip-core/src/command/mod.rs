// ── Command API ──
//
// Writes go straight from a surface to the device handle; the coordinator
// is not in the path. The new state shows up later as an ordinary change
// notification.

pub mod requests;

use serde::Serialize;

use crate::device::DeviceHandle;
use crate::error::CoreError;
use crate::model::{EffectCode, Rgb};

pub use requests::{TurnOnRequest, plan_turn_off, plan_turn_on};

/// One write operation against a device handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum DeviceCommand {
    SetPower(bool),
    /// Native brightness, 0..=100.
    SetBrightness(u8),
    SetColor { color: Rgb, color_correction: bool },
    SetEffect(EffectCode),
}

impl DeviceCommand {
    /// Driver operation name, used in logs and errors.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::SetPower(_) => "set_power",
            Self::SetBrightness(_) => "set_brightness",
            Self::SetColor { .. } => "set_color",
            Self::SetEffect(_) => "set_effect",
        }
    }

    /// Issue this command on `handle` and wait for the driver to accept it.
    pub async fn apply(&self, handle: &dyn DeviceHandle) -> Result<(), CoreError> {
        let result = match *self {
            Self::SetPower(on) => handle.set_power(on).await,
            Self::SetBrightness(percent) => handle.set_brightness(percent).await,
            Self::SetColor {
                color,
                color_correction,
            } => handle.set_color(color, color_correction).await,
            Self::SetEffect(code) => handle.set_effect(code).await,
        };
        result.map_err(|source| CoreError::Command {
            operation: self.operation().into(),
            source,
        })
    }
}

/// Run a command plan in order. The first failure stops the plan and is
/// returned; earlier commands are not rolled back.
pub async fn execute_plan(
    handle: &dyn DeviceHandle,
    plan: &[DeviceCommand],
) -> Result<(), CoreError> {
    for command in plan {
        command.apply(handle).await?;
    }
    Ok(())
}
