pub mod config;
pub mod pipeline;
pub mod terminal;

pub use config::{CellGridConfig, ColorMode, DitherMode, GridSize, ScaleMode};
pub use pipeline::{Pipeline, Stage};
