// ── Device belief and published snapshot ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::brightness;
use super::color::Rgb;
use super::effect::{Effect, EffectCode};

/// What the device driver currently believes about the strip.
///
/// Every field except `connected` may be unknown. Unknown is distinct
/// from off or zero and must survive into the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceBelief {
    pub power: Option<bool>,
    pub color: Option<Rgb>,
    /// Native brightness, 0..=100.
    pub brightness: Option<u8>,
    pub effect: Option<EffectCode>,
    /// Signal strength in dBm.
    pub rssi: Option<i16>,
    pub connected: bool,
}

/// One immutable, fully-formed view of the strip as seen by observers.
///
/// Built in one step from a [`DeviceBelief`] and never mutated after it
/// is published. A newer snapshot replaces it entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Publish sequence number, starts at 1 for the first published
    /// snapshot. Strictly increasing per coordinator.
    pub version: u64,
    pub connected: bool,
    pub power: Option<bool>,
    pub color: Option<Rgb>,
    /// Presentation brightness, 0..=255.
    pub brightness: Option<u8>,
    pub effect: Effect,
    pub rssi: Option<i16>,
    pub updated_at: DateTime<Utc>,
}

impl Snapshot {
    /// The placeholder published before any device state is known.
    pub fn unavailable(version: u64) -> Self {
        Self::from_belief(&DeviceBelief::default(), version)
    }

    pub fn from_belief(belief: &DeviceBelief, version: u64) -> Self {
        Self {
            version,
            connected: belief.connected,
            power: belief.power,
            color: belief.color,
            brightness: brightness::to_presentation(belief.brightness),
            effect: Effect::from_code(belief.effect),
            rssi: belief.rssi,
            updated_at: Utc::now(),
        }
    }

    /// Surfaces treat a disconnected device as unavailable.
    pub fn is_available(&self) -> bool {
        self.connected
    }
}
