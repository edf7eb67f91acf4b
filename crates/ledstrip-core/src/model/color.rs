// ── RGB colour ──

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An 8-bit-per-channel RGB triple as sent to and reported by the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Full-intensity white, the neutral colour used when an effect
    /// cannot be applied.
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for (u8, u8, u8) {
    fn from(c: Rgb) -> Self {
        (c.r, c.g, c.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid colour '{input}': expected #rrggbb or r,g,b")]
pub struct ColorParseError {
    pub input: String,
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    /// Parses `#rrggbb`, `rrggbb`, or `r,g,b` (decimal).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError { input: s.into() };
        let trimmed = s.trim();

        if trimmed.contains(',') {
            let parts: Vec<u8> = trimmed
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .map_err(|_| err())?;
            return match parts.as_slice() {
                [r, g, b] => Ok(Self::new(*r, *g, *b)),
                _ => Err(err()),
            };
        }

        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!("#ff8000".parse::<Rgb>().unwrap(), Rgb::new(255, 128, 0));
        assert_eq!("00FF10".parse::<Rgb>().unwrap(), Rgb::new(0, 255, 16));
    }

    #[test]
    fn parses_decimal_triple() {
        assert_eq!("10, 20,30".parse::<Rgb>().unwrap(), Rgb::new(10, 20, 30));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("#fff".parse::<Rgb>().is_err());
        assert!("1,2".parse::<Rgb>().is_err());
        assert!("256,0,0".parse::<Rgb>().is_err());
        assert!("zzzzzz".parse::<Rgb>().is_err());
    }

    #[test]
    fn display_is_lowercase_hex() {
        assert_eq!(Rgb::WHITE.to_string(), "#ffffff");
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "#010203");
    }
}
