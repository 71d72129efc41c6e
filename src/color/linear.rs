//! Linear-light RGB and the sRGB transfer function.
//!
//! Averaging pixels (scaling, clustering) and mixing a glyph's ink with its
//! paper only give physically sensible results on linear values.

use std::ops::{Add, Mul};
use std::sync::OnceLock;

use super::rgb::Color;

static DECODE_LUT: OnceLock<[f32; 256]> = OnceLock::new();

fn decode_exact(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Decode an 8-bit sRGB channel to linear light (0.0..=1.0).
#[inline]
pub fn srgb_to_linear(v: u8) -> f32 {
    let lut = DECODE_LUT.get_or_init(|| {
        let mut lut = [0.0f32; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = decode_exact(i as f32 / 255.0);
        }
        lut
    });
    lut[v as usize]
}

/// Encode a linear-light value back to an 8-bit sRGB channel, rounding to nearest.
#[inline]
pub fn linear_to_srgb(l: f32) -> u8 {
    let l = l.clamp(0.0, 1.0);
    let v = if l <= 0.003_130_8 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    };
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// A color in linear light. Channels are nominally 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl LinearRgb {
    #[inline]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Mix `self` toward `other`; `t = 0` is `self`, `t = 1` is `other`.
    #[inline]
    pub fn lerp(self, other: LinearRgb, t: f32) -> LinearRgb {
        self * (1.0 - t) + other * t
    }

    #[inline]
    pub fn channel(self, index: usize) -> f32 {
        match index {
            0 => self.r,
            1 => self.g,
            _ => self.b,
        }
    }

    #[inline]
    pub fn to_color(self) -> Color {
        Color::new(
            linear_to_srgb(self.r),
            linear_to_srgb(self.g),
            linear_to_srgb(self.b),
        )
    }
}

impl From<Color> for LinearRgb {
    #[inline]
    fn from(c: Color) -> Self {
        Self {
            r: srgb_to_linear(c.r),
            g: srgb_to_linear(c.g),
            b: srgb_to_linear(c.b),
        }
    }
}

impl Add for LinearRgb {
    type Output = LinearRgb;

    #[inline]
    fn add(self, rhs: LinearRgb) -> LinearRgb {
        LinearRgb::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl Mul<f32> for LinearRgb {
    type Output = LinearRgb;

    #[inline]
    fn mul(self, k: f32) -> LinearRgb {
        LinearRgb::new(self.r * k, self.g * k, self.b * k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_is_exact() {
        for v in 0..=255u8 {
            assert_eq!(linear_to_srgb(srgb_to_linear(v)), v, "level {v}");
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert!((srgb_to_linear(255) - 1.0).abs() < 1e-6);
        // sRGB 0.5 (~128) decodes to ~0.214
        assert!((srgb_to_linear(128) - 0.2158).abs() < 0.001);
        // linear 0.5 encodes to ~188
        assert_eq!(linear_to_srgb(0.5), 188);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(linear_to_srgb(-0.3), 0);
        assert_eq!(linear_to_srgb(1.7), 255);
    }

    #[test]
    fn test_lerp_endpoints() {
        let black = LinearRgb::from(Color::BLACK);
        let white = LinearRgb::from(Color::WHITE);
        assert_eq!(black.lerp(white, 0.0).to_color(), Color::BLACK);
        assert_eq!(black.lerp(white, 1.0).to_color(), Color::WHITE);
        // half the light of white is lighter than sRGB mid-gray
        assert_eq!(black.lerp(white, 0.5).to_color(), Color::new(188, 188, 188));
    }
}
