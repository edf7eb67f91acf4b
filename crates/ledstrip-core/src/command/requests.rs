// ── Light control requests ──
//
// Turns a high-level "turn on with these attributes" request into the
// ordered list of device commands that carries it out.

use serde::{Deserialize, Serialize};

use super::DeviceCommand;
use crate::config::StripOptions;
use crate::model::{Rgb, brightness, name_to_code};

/// Attributes supplied with a turn-on. Each one is optional; an empty
/// request only powers the strip on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOnRequest {
    /// Presentation brightness, 0..=255.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    /// Presentation effect name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
}

impl TurnOnRequest {
    #[must_use]
    pub fn with_brightness(mut self, value: u8) -> Self {
        self.brightness = Some(value);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_effect(mut self, name: impl Into<String>) -> Self {
        self.effect = Some(name.into());
        self
    }
}

/// Build the command sequence for a turn-on.
///
/// `is_on` is the light's last rendered power state; unknown counts as
/// off. Order: power, brightness, colour, effect. An effect name with no
/// firmware code (including `off`) becomes solid white.
pub fn plan_turn_on(
    is_on: Option<bool>,
    request: &TurnOnRequest,
    options: &StripOptions,
) -> Vec<DeviceCommand> {
    let mut plan = Vec::with_capacity(4);

    if is_on != Some(true) {
        plan.push(DeviceCommand::SetPower(true));
    }

    if let Some(value) = request.brightness {
        plan.push(DeviceCommand::SetBrightness(brightness::to_native(value)));
    }

    if let Some(color) = request.color {
        plan.push(DeviceCommand::SetColor {
            color,
            color_correction: options.color_correction,
        });
    }

    if let Some(name) = request.effect.as_deref() {
        plan.push(match name_to_code(name) {
            Some(code) => DeviceCommand::SetEffect(code),
            None => DeviceCommand::SetColor {
                color: Rgb::WHITE,
                color_correction: options.color_correction,
            },
        });
    }

    plan
}

pub fn plan_turn_off() -> Vec<DeviceCommand> {
    vec![DeviceCommand::SetPower(false)]
}
