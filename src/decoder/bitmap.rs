use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::error::RenderError;

/// An owned RGBA bitmap with non-zero dimensions.
///
/// Every pipeline stage takes one of these and hands back a new one; nothing
/// mutates a bitmap after it has been produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pixels: RgbaImage,
}

impl Bitmap {
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, RenderError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "bitmap must not be empty (got {}x{})",
                pixels.width(),
                pixels.height()
            )));
        }
        Ok(Self { pixels })
    }

    /// Build a bitmap from row-major RGBA bytes.
    pub fn from_raw(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RenderError::InvalidConfig(format!(
                "{width}x{height} bitmap needs {expected} bytes, got {}",
                rgba.len()
            )));
        }
        let pixels = RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
            RenderError::InvalidConfig(format!("{width}x{height} bitmap buffer rejected"))
        })?;
        Self::from_rgba(pixels)
    }

    /// A bitmap of one opaque color.
    pub fn filled(width: u32, height: u32, color: Color) -> Result<Self, RenderError> {
        Self::from_rgba(RgbaImage::from_pixel(
            width,
            height,
            Rgba([color.r, color.g, color.b, 255]),
        ))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// RGBA at `(x, y)`. Callers stay in bounds; out-of-range panics like slice indexing.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    /// The RGB part of the pixel at `(x, y)`, alpha ignored.
    #[inline]
    pub fn color(&self, x: u32, y: u32) -> Color {
        let [r, g, b, _] = self.pixel(x, y);
        Color::new(r, g, b)
    }

    /// New bitmap of the same size with `f` applied to every RGBA pixel.
    pub fn map_pixels(&self, mut f: impl FnMut([u8; 4]) -> [u8; 4]) -> Bitmap {
        let src = &self.pixels;
        let pixels = RgbaImage::from_fn(src.width(), src.height(), |x, y| {
            Rgba(f(src.get_pixel(x, y).0))
        });
        Bitmap { pixels }
    }

    pub fn is_opaque(&self) -> bool {
        self.pixels.pixels().all(|p| p.0[3] == 255)
    }

    #[inline]
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }
}
