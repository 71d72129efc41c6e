pub mod cell;
pub mod display;
pub mod matte;
pub mod processor;
pub mod quantizer;
pub mod scaler;

pub use cell::{AnsiImage, Cell, Glyph, Shade};
pub use display::CellGridRenderer;
pub use processor::CellProcessor;
pub use quantizer::ColorQuantizer;
