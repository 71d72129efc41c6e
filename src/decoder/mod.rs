pub mod bitmap;
pub mod still;

pub use bitmap::Bitmap;
pub use still::{decode_bitmap, load_bitmap};
