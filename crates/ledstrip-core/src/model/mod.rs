// ── Domain model ──
//
// Wire-level encodings (effect codes, percent brightness) and the
// presentation-level snapshot that observers consume.

pub mod address;
pub mod brightness;
pub mod color;
pub mod effect;
pub mod snapshot;

// ── Re-exports ──────────────────────────────────────────────────────

pub use address::{AddressParseError, DeviceAddress};
pub use color::{ColorParseError, Rgb};
pub use effect::{Effect, EffectCode, NAMED_COUNT, RESERVED_BASE, code_to_name, name_to_code};
pub use snapshot::{DeviceBelief, Snapshot};
