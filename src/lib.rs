//! Render raster images as colored terminal cells.
//!
//! A decoded [`Bitmap`] goes through a fixed chain of stages: matte
//! compositing, scaling to the cell grid, dithering into [`Cell`]s and finally
//! encoding into one ANSI escape stream. [`Pipeline`] drives the chain from a
//! validated [`CellGridConfig`].

pub mod color;
pub mod core;
pub mod decoder;
pub mod error;
pub mod renderer;

pub use crate::color::Color;
pub use crate::core::{CellGridConfig, ColorMode, DitherMode, Pipeline, ScaleMode};
pub use crate::decoder::{load_bitmap, Bitmap};
pub use crate::error::RenderError;
pub use crate::renderer::{AnsiImage, Cell};
