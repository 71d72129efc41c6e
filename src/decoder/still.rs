use std::path::Path;

use tracing::debug;

use super::bitmap::Bitmap;
use crate::error::RenderError;

/// Read and decode an image file into an RGBA bitmap.
///
/// The format is sniffed from the file contents, so any format the `image`
/// crate was built with works (PNG, JPEG, GIF, BMP, TIFF, WebP by default).
/// Animated formats yield their first frame.
pub fn load_bitmap(path: impl AsRef<Path>) -> Result<Bitmap, RenderError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_bitmap(path, &bytes)
}

/// Decode in-memory image bytes. `origin` only labels errors.
pub fn decode_bitmap(origin: &Path, bytes: &[u8]) -> Result<Bitmap, RenderError> {
    let decoded = image::load_from_memory(bytes).map_err(|source| RenderError::DecodeFailure {
        path: origin.to_path_buf(),
        source,
    })?;
    debug!(
        path = %origin.display(),
        width = decoded.width(),
        height = decoded.height(),
        color = ?decoded.color(),
        "decoded image"
    );
    Bitmap::from_rgba(decoded.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_bitmap("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
        assert_eq!(err.exit_code(), 255);
    }

    #[test]
    fn test_garbage_is_decode_failure() {
        let err = decode_bitmap(Path::new("noise.bin"), b"not an image at all").unwrap_err();
        assert!(matches!(err, RenderError::DecodeFailure { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_png_keeps_alpha() {
        let mut img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        img.put_pixel(2, 1, Rgba([0, 0, 0, 0]));
        let mut encoded = Cursor::new(Vec::new());
        img.write_to(&mut encoded, ImageOutputFormat::Png).unwrap();

        let bitmap = decode_bitmap(Path::new("mem.png"), encoded.get_ref()).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (3, 2));
        assert_eq!(bitmap.pixel(0, 0), [10, 20, 30, 255]);
        assert_eq!(bitmap.pixel(2, 1)[3], 0);
    }
}
