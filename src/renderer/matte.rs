use crate::color::Color;
use crate::decoder::Bitmap;

/// Flatten `bitmap` onto `matte`, returning an opaque bitmap.
///
/// Per channel: `src * a / 255 + matte * (255 - a) / 255`, rounded to nearest.
/// Fully opaque pixels come through untouched and fully transparent ones
/// become exactly the matte color.
pub fn composite(bitmap: &Bitmap, matte: Color) -> Bitmap {
    bitmap.map_pixels(|[r, g, b, a]| {
        [
            blend(r, matte.r, a),
            blend(g, matte.g, a),
            blend(b, matte.b, a),
            255,
        ]
    })
}

#[inline]
fn blend(src: u8, matte: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    let mixed = src as u32 * a + matte as u32 * (255 - a);
    // max is 255 * 255, so the rounded quotient never leaves u8
    ((mixed + 127) / 255) as u8
}
