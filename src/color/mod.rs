//! Color types shared by the scaler and the dither engine.
//!
//! - [`Color`]: 8-bit sRGB, what bitmaps store and terminals receive.
//! - [`LinearRgb`]: linear light, where averaging and blending happen.
//! - [`Oklab`]: perceptual space, where "closest color" is decided.

mod linear;
mod oklab;
mod rgb;

pub use linear::{linear_to_srgb, srgb_to_linear, LinearRgb};
pub use oklab::Oklab;
pub use rgb::{Color, ParseColorError};
