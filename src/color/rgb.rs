//! 24-bit sRGB color with hex parsing.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::linear::LinearRgb;
use super::oklab::Oklab;

/// A 24-bit sRGB color, the unit a terminal understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Error returned when a matte string is not a 6-digit hex color.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("expected 6 hex digits (RRGGBB)")]
    InvalidLength,
    #[error("'{0}' is not a hex color")]
    InvalidHex(String),
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB` or `#RRGGBB`, case-insensitive, surrounding whitespace ignored.
    ///
    /// ```
    /// use imgfetch::color::Color;
    ///
    /// assert_eq!(Color::from_hex("ff0000").unwrap(), Color::new(255, 0, 0));
    /// assert_eq!(Color::from_hex("#0A0b0C").unwrap(), Color::new(10, 11, 12));
    /// assert!(Color::from_hex("fff").is_err());
    /// ```
    pub fn from_hex(s: &str) -> Result<Self, ParseColorError> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if digits.len() != 6 {
            return Err(ParseColorError::InvalidLength);
        }
        // from_str_radix tolerates a leading '+', so check the digits first
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError::InvalidHex(s.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ParseColorError::InvalidHex(s.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Lowercase `rrggbb`, no leading `#`.
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    #[inline]
    pub fn to_linear(self) -> LinearRgb {
        LinearRgb::from(self)
    }

    #[inline]
    pub fn to_oklab(self) -> Oklab {
        Oklab::from(self.to_linear())
    }
}

impl From<[u8; 3]> for Color {
    fn from(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("000000").unwrap(), Color::BLACK);
        assert_eq!(Color::from_hex("FFFFFF").unwrap(), Color::WHITE);
        assert_eq!(Color::from_hex("#ff0000").unwrap(), Color::new(255, 0, 0));
        assert_eq!(Color::from_hex("  12ab3C ").unwrap(), Color::new(0x12, 0xab, 0x3c));
        assert_eq!("00ff00".parse::<Color>().unwrap(), Color::new(0, 255, 0));
    }

    #[test]
    fn test_hex_parsing_errors() {
        assert_eq!(Color::from_hex(""), Err(ParseColorError::InvalidLength));
        assert_eq!(Color::from_hex("#fff"), Err(ParseColorError::InvalidLength));
        assert_eq!(Color::from_hex("1234567"), Err(ParseColorError::InvalidLength));
        assert!(matches!(Color::from_hex("gg0000"), Err(ParseColorError::InvalidHex(_))));
        assert!(matches!(Color::from_hex("+f0000"), Err(ParseColorError::InvalidHex(_))));
    }

    #[test]
    fn test_hex_round_trip() {
        for color in [Color::BLACK, Color::WHITE, Color::new(1, 128, 254)] {
            assert_eq!(Color::from_hex(&color.to_hex()).unwrap(), color);
        }
        assert_eq!(Color::new(255, 0, 16).to_string(), "#ff0010");
    }
}
