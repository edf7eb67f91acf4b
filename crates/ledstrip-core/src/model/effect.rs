// ── Effect codec ──
//
// The strip firmware uses one flat enumeration of effect codes. The low
// codes are solid-colour primitives (red, green, blue, yellow, teal,
// purple, white) that are set through the colour path instead, so the
// presentation layer only names the codes from `RESERVED_BASE` upward.
//
// Decoding is lenient: any code outside the named range reads as `off`.
// Some firmware revisions report codes outside the documented table after
// a physical button press, and that must never fail a state refresh.

use serde::{Deserialize, Serialize};
use strum::{
    AsRefStr, Display, EnumCount, EnumIter, EnumString, FromRepr, IntoEnumIterator, IntoStaticStr,
};

/// Raw effect code as carried in device notifications and commands.
pub type EffectCode = i32;

/// First firmware code that maps to a named effect (`switch_rgb`).
/// Codes below it are reserved colour primitives.
pub const RESERVED_BASE: EffectCode = 7;

/// Number of entries in the named-effect table, `off` included.
pub const NAMED_COUNT: usize = Effect::COUNT;

/// Presentation-facing effect names, in firmware order.
///
/// Position 0 is the `off` sentinel; position `n > 0` corresponds to
/// firmware code `n + RESERVED_BASE - 1`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    IntoStaticStr,
    AsRefStr,
    FromRepr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Effect {
    #[default]
    Off = 0,
    SwitchRgb,
    SwitchAll,
    FadeFast,
    FadeSlow,
    BlinkRed,
    BlinkGreen,
    BlinkBlue,
    BlinkYellow,
    BlinkTeal,
    BlinkPurple,
    BlinkWhite,
    FadeRedGreen,
    FadeRedBlue,
    FadeGreenBlue,
    FlashAll,
    FlashRed,
    FlashGreen,
    FlashBlue,
    FlashYellow,
    FlashTeal,
    FlashPurple,
    FlashWhite,
    StrobeRgb,
    StrobeAll,
}

impl Effect {
    /// Position in the named table (0 for `off`).
    #[allow(clippy::as_conversions)]
    pub const fn position(self) -> u8 {
        self as u8
    }

    /// Decode a firmware code. `None`, reserved codes, and codes past the
    /// end of the table all decode to [`Effect::Off`].
    pub fn from_code(code: Option<EffectCode>) -> Self {
        let Some(code) = code else {
            return Self::Off;
        };
        let offset = i64::from(code) - i64::from(RESERVED_BASE) + 1;
        u8::try_from(offset)
            .ok()
            .filter(|pos| *pos >= 1)
            .and_then(Self::from_repr)
            .unwrap_or(Self::Off)
    }

    /// Encode to a firmware code. `off` has no code: it means "leave the
    /// effect unset".
    pub fn code(self) -> Option<EffectCode> {
        match self {
            Self::Off => None,
            named => Some(EffectCode::from(named.position()) + RESERVED_BASE - 1),
        }
    }

    /// Look up an effect by its exact presentation name.
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// The full effect list in table order, `off` first.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// Decode a firmware code to its presentation name (`"off"` on fallback).
pub fn code_to_name(code: Option<EffectCode>) -> &'static str {
    Effect::from_code(code).name()
}

/// Encode a presentation name to a firmware code. Unknown names and
/// `"off"` both yield `None`.
pub fn name_to_code(name: &str) -> Option<EffectCode> {
    Effect::from_name(name).and_then(Effect::code)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn table_has_off_plus_twenty_four_effects() {
        assert_eq!(NAMED_COUNT, 25);
        assert_eq!(Effect::all().next(), Some(Effect::Off));
        assert_eq!(Effect::StrobeAll.position(), 24);
    }

    #[test]
    fn every_named_effect_round_trips() {
        for effect in Effect::all().filter(|e| *e != Effect::Off) {
            let code = name_to_code(effect.name());
            assert!(code.is_some(), "{effect} should have a code");
            assert_eq!(code_to_name(code), effect.name());
        }
    }

    #[test]
    fn every_named_code_round_trips() {
        let highest = RESERVED_BASE + 23;
        for code in RESERVED_BASE..=highest {
            let name = code_to_name(Some(code));
            assert_ne!(name, "off", "code {code} should be named");
            assert_eq!(name_to_code(name), Some(code));
        }
    }

    #[test]
    fn boundary_codes() {
        assert_eq!(Effect::from_code(Some(7)), Effect::SwitchRgb);
        assert_eq!(Effect::from_code(Some(30)), Effect::StrobeAll);
        assert_eq!(Effect::SwitchRgb.code(), Some(7));
        assert_eq!(Effect::StrobeAll.code(), Some(30));
    }

    #[test]
    fn reserved_codes_decode_to_off() {
        for code in 0..RESERVED_BASE {
            assert_eq!(code_to_name(Some(code)), "off", "code {code}");
        }
    }

    #[test]
    fn out_of_range_codes_decode_to_off() {
        for code in [-1, -100, 31, 200, 1000, EffectCode::MIN, EffectCode::MAX] {
            assert_eq!(code_to_name(Some(code)), "off", "code {code}");
        }
    }

    #[test]
    fn off_and_none() {
        assert_eq!(name_to_code("off"), None);
        assert_eq!(code_to_name(None), "off");
        assert_eq!(Effect::Off.code(), None);
    }

    #[test]
    fn unknown_names_have_no_code() {
        assert_eq!(name_to_code("totally_unknown"), None);
        assert_eq!(name_to_code(""), None);
        // Names are exact-match.
        assert_eq!(name_to_code("Blink_Red"), None);
    }

    #[test]
    fn blink_red_round_trips_exactly() {
        let code = name_to_code("blink_red");
        assert_eq!(code, Some(11));
        assert_eq!(code_to_name(code), "blink_red");
    }

    #[test]
    fn serde_uses_presentation_names() {
        let json = serde_json::to_string(&Effect::FadeRedGreen).unwrap();
        assert_eq!(json, "\"fade_red_green\"");
        let back: Effect = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Effect::FadeRedGreen);
    }
}
