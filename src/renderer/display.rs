use std::ops::Range;

use rayon::prelude::*;
use tracing::debug;

use super::cell::{AnsiImage, Cell};
use super::quantizer::ColorQuantizer;
use crate::color::Color;
use crate::core::config::{CellGridConfig, ColorMode};
use crate::error::RenderError;

/// SGR reset, closes every row.
pub const RESET: &[u8] = b"\x1b[0m";

/// Encodes an [`AnsiImage`] into one escape-sequence stream.
///
/// Rows are split into contiguous bands, each band is encoded on its own
/// worker, and the band buffers are joined in row order. The result does not
/// depend on the worker count.
pub struct CellGridRenderer {
    workers: usize,
    color_mode: ColorMode,
}

impl CellGridRenderer {
    pub fn new(workers: usize, color_mode: ColorMode) -> Self {
        Self {
            workers: workers.max(1),
            color_mode,
        }
    }

    pub fn from_config(config: &CellGridConfig) -> Self {
        Self::new(config.workers(), config.color_mode())
    }

    pub fn render(&self, image: &AnsiImage) -> Result<Vec<u8>, RenderError> {
        let bands = partition_rows(image.height(), self.workers);
        // one thread per band, never more
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(bands.len().max(1))
            .thread_name(|i| format!("imgfetch-band-{i}"))
            .build()?;

        let buffers: Vec<Vec<u8>> = pool.install(|| {
            bands
                .par_iter()
                .map(|rows| render_band(image, rows.clone(), self.color_mode))
                .collect::<Result<_, _>>()
        })?;

        let mut stream = Vec::with_capacity(buffers.iter().map(Vec::len).sum());
        for buffer in &buffers {
            stream.extend_from_slice(buffer);
        }
        debug!(
            bands = bands.len(),
            workers = self.workers,
            bytes = stream.len(),
            "rendered cell grid"
        );
        Ok(stream)
    }
}

/// Split `[0, height)` into `min(workers, height)` contiguous bands.
///
/// Band sizes differ by at most one row; the first `height % bands` bands
/// take the extra row.
pub fn partition_rows(height: usize, workers: usize) -> Vec<Range<usize>> {
    let count = workers.max(1).min(height);
    if count == 0 {
        return Vec::new();
    }
    let base = height / count;
    let extra = height % count;

    let mut bands = Vec::with_capacity(count);
    let mut start = 0;
    for i in 0..count {
        let len = base + usize::from(i < extra);
        bands.push(start..start + len);
        start += len;
    }
    bands
}

/// Encode rows `rows` of `image`. Every row ends with a reset; all but the
/// image's last row are followed by a newline.
pub fn render_band(
    image: &AnsiImage,
    rows: Range<usize>,
    color_mode: ColorMode,
) -> Result<Vec<u8>, RenderError> {
    // Rough upper bound per cell: two color sequences plus a 3-byte glyph
    let mut buffer = Vec::with_capacity(rows.len() * image.width() * 20);

    for y in rows.clone() {
        let row = image.row(y).ok_or_else(|| {
            RenderError::RenderInvariantViolation(format!(
                "row {y} of band {rows:?} is outside a {}-row image",
                image.height()
            ))
        })?;
        encode_row(&mut buffer, row, color_mode);
        buffer.extend_from_slice(RESET);
        if y + 1 < image.height() {
            buffer.push(b'\n');
        }
    }
    Ok(buffer)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Paint {
    Rgb(Color),
    Indexed(u8),
}

impl Paint {
    fn new(color: Color, mode: ColorMode) -> Self {
        match mode {
            ColorMode::Truecolor => Paint::Rgb(color),
            ColorMode::Ansi256 => Paint::Indexed(ColorQuantizer::quantize(color)),
        }
    }
}

fn encode_row(buffer: &mut Vec<u8>, row: &[Cell], mode: ColorMode) {
    let mut last_fg: Option<Paint> = None;
    let mut last_bg: Option<Paint> = None;

    for cell in row {
        let bg = Paint::new(cell.bg, mode);
        if Some(bg) != last_bg {
            push_sgr(buffer, b"48", bg);
            last_bg = Some(bg);
        }
        if cell.glyph.uses_foreground() {
            let fg = Paint::new(cell.fg, mode);
            if Some(fg) != last_fg {
                push_sgr(buffer, b"38", fg);
                last_fg = Some(fg);
            }
        }
        let mut utf8 = [0u8; 4];
        buffer.extend_from_slice(cell.glyph.as_char().encode_utf8(&mut utf8).as_bytes());
    }
}

// ESC [ <layer> ; 2 ; r ; g ; b m  or  ESC [ <layer> ; 5 ; n m
fn push_sgr(buffer: &mut Vec<u8>, layer: &[u8], paint: Paint) {
    buffer.extend_from_slice(b"\x1b[");
    buffer.extend_from_slice(layer);
    match paint {
        Paint::Rgb(c) => {
            buffer.extend_from_slice(b";2;");
            push_u8(buffer, c.r);
            buffer.push(b';');
            push_u8(buffer, c.g);
            buffer.push(b';');
            push_u8(buffer, c.b);
        }
        Paint::Indexed(n) => {
            buffer.extend_from_slice(b";5;");
            push_u8(buffer, n);
        }
    }
    buffer.push(b'm');
}

#[inline(always)]
fn push_u8(buffer: &mut Vec<u8>, n: u8) {
    if n >= 100 {
        buffer.push(b'0' + n / 100);
    }
    if n >= 10 {
        buffer.push(b'0' + (n / 10) % 10);
    }
    buffer.push(b'0' + n % 10);
}
