// ── Brightness rescaling ──
//
// The strip reports and accepts brightness as a percentage (0..=100, where
// 0 is "on but dim", not off). Lighting UIs use 0..=255.
//
// `to_presentation` rounds up and `to_native` rounds down. Together they
// give an exact round trip for every native value, and a native value
// computed from a UI value never maps back above that UI value.

/// Highest native brightness (percent).
pub const NATIVE_MAX: u8 = 100;

/// Highest presentation brightness.
pub const PRESENTATION_MAX: u8 = 255;

/// Scale a native percentage to the presentation range. Unknown stays
/// unknown; values above 100 clamp to 100.
pub fn to_presentation(native: Option<u8>) -> Option<u8> {
    native.map(|percent| {
        let percent = u32::from(percent.min(NATIVE_MAX));
        let scaled = (percent * u32::from(PRESENTATION_MAX)).div_ceil(u32::from(NATIVE_MAX));
        u8::try_from(scaled).unwrap_or(PRESENTATION_MAX)
    })
}

/// Scale a presentation value to a native percentage, rounding down.
pub fn to_native(presentation: u8) -> u8 {
    let scaled = u32::from(presentation) * u32::from(NATIVE_MAX) / u32::from(PRESENTATION_MAX);
    u8::try_from(scaled).unwrap_or(NATIVE_MAX)
}
