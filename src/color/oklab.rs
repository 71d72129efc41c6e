//! Oklab perceptual color space.
//!
//! Björn Ottosson, "A perceptual color space for image processing"
//! <https://bottosson.github.io/posts/oklab/>

use super::linear::LinearRgb;

/// A color in Oklab. Euclidean distance here tracks perceived difference,
/// which is what glyph selection and 256-color matching minimize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklab {
    /// Lightness, 0.0 (black) to 1.0 (white)
    pub l: f32,
    /// Green-red axis
    pub a: f32,
    /// Blue-yellow axis
    pub b: f32,
}

impl Oklab {
    #[inline]
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Squared Euclidean distance; compare these instead of taking the root.
    #[inline]
    pub fn distance_squared(self, other: Oklab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl * dl + da * da + db * db
    }
}

impl From<LinearRgb> for Oklab {
    fn from(rgb: LinearRgb) -> Self {
        // linear sRGB -> LMS
        let l = 0.412_221_46 * rgb.r + 0.536_332_55 * rgb.g + 0.051_445_995 * rgb.b;
        let m = 0.211_903_5 * rgb.r + 0.680_699_5 * rgb.g + 0.107_396_96 * rgb.b;
        let s = 0.088_302_46 * rgb.r + 0.281_718_85 * rgb.g + 0.629_978_7 * rgb.b;

        let l_ = l.cbrt();
        let m_ = m.cbrt();
        let s_ = s.cbrt();

        Oklab {
            l: 0.210_454_26 * l_ + 0.793_617_8 * m_ - 0.004_072_047 * s_,
            a: 1.977_998_5 * l_ - 2.428_592_2 * m_ + 0.450_593_7 * s_,
            b: 0.025_904_037 * l_ + 0.782_771_77 * m_ - 0.808_675_77 * s_,
        }
    }
}
