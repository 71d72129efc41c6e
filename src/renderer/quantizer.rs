//! xterm 256-color quantizer
//!
//! Used when the stream is emitted with `38;5;n` / `48;5;n` instead of
//! 24-bit color. Only the fixed part of the palette (16..=255) is a target;
//! the first 16 entries are remapped by terminal themes.

use std::sync::OnceLock;

use crate::color::{Color, Oklab};

static PALETTE_LAB: OnceLock<Vec<(u8, Oklab)>> = OnceLock::new();

pub struct ColorQuantizer;

impl ColorQuantizer {
    /// Index of the perceptually nearest color in the 6x6x6 cube or the gray ramp.
    pub fn quantize(color: Color) -> u8 {
        let palette = PALETTE_LAB.get_or_init(|| {
            (16..=255u8)
                .map(|index| (index, Color::from(Self::ansi256_to_rgb(index)).to_oklab()))
                .collect()
        });

        let target = color.to_oklab();
        let mut best = (16u8, f32::INFINITY);
        for &(index, lab) in palette {
            let d = lab.distance_squared(target);
            if d < best.1 {
                best = (index, d);
            }
        }
        best.0
    }

    /// RGB value of an xterm palette index
    ///
    /// - 0-15: xterm's default standard and bright colors. Terminal themes
    ///   remap these, so [`ColorQuantizer::quantize`] never returns them and
    ///   they only serve this inverse lookup.
    /// - 16-231: 6x6x6 cube, levels 0, 95, 135, 175, 215, 255
    /// - 232-255: grays 8, 18, ..., 238
    pub fn ansi256_to_rgb(index: u8) -> [u8; 3] {
        match index {
            0..=15 => {
                const STANDARD: [[u8; 3]; 16] = [
                    [0, 0, 0],
                    [128, 0, 0],
                    [0, 128, 0],
                    [128, 128, 0],
                    [0, 0, 128],
                    [128, 0, 128],
                    [0, 128, 128],
                    [192, 192, 192],
                    [128, 128, 128],
                    [255, 0, 0],
                    [0, 255, 0],
                    [255, 255, 0],
                    [0, 0, 255],
                    [255, 0, 255],
                    [0, 255, 255],
                    [255, 255, 255],
                ];
                STANDARD[index as usize]
            }
            16..=231 => {
                let i = index - 16;
                let level = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
                [level(i / 36), level((i / 6) % 6), level(i % 6)]
            }
            232..=255 => {
                let gray = 8 + (index - 232) * 10;
                [gray, gray, gray]
            }
        }
    }
}
