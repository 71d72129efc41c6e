use rayon::prelude::*;
use tracing::debug;

use super::cell::{AnsiImage, Cell, Glyph, Shade};
use crate::color::{Color, LinearRgb, Oklab};
use crate::core::config::{BlockFactor, CellGridConfig, DitherMode};
use crate::decoder::Bitmap;
use crate::error::RenderError;

/// ASCII characters ordered by how much of the cell they ink.
pub const DENSITY_RAMP: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Turns a scaled bitmap into cells, one pixel block at a time.
pub struct CellProcessor {
    mode: DitherMode,
    block: BlockFactor,
}

impl CellProcessor {
    pub fn new(mode: DitherMode) -> Self {
        Self {
            mode,
            block: mode.block_factor(),
        }
    }

    pub fn from_config(config: &CellGridConfig) -> Self {
        Self::new(config.dither())
    }

    pub fn process(&self, bitmap: &Bitmap) -> Result<AnsiImage, RenderError> {
        let BlockFactor { x: bx, y: by } = self.block;
        if bitmap.width() % bx != 0 || bitmap.height() % by != 0 {
            return Err(RenderError::RenderInvariantViolation(format!(
                "{}x{} bitmap is not a whole number of {bx}x{by} blocks",
                bitmap.width(),
                bitmap.height()
            )));
        }

        let cols = (bitmap.width() / bx) as usize;
        let rows = (bitmap.height() / by) as usize;
        let mut cells = vec![Cell::default(); cols * rows];

        // each row of cells only reads its own band of pixels
        cells.par_chunks_mut(cols).enumerate().for_each(|(cy, row)| {
            for (cx, cell) in row.iter_mut().enumerate() {
                *cell = self.process_block(bitmap, cx as u32, cy as u32);
            }
        });

        debug!(cols, rows, mode = ?self.mode, "dithered cells");
        AnsiImage::new(cols, rows, cells)
    }

    fn process_block(&self, bitmap: &Bitmap, cx: u32, cy: u32) -> Cell {
        let x0 = cx * self.block.x;
        let y0 = cy * self.block.y;

        match self.mode {
            DitherMode::None => half_block(bitmap.color(x0, y0), bitmap.color(x0, y0 + 1)),
            DitherMode::Block | DitherMode::Char => {
                let mut pixels = Vec::with_capacity(self.block.area());
                for y in y0..y0 + self.block.y {
                    for x in x0..x0 + self.block.x {
                        pixels.push(bitmap.color(x, y));
                    }
                }
                cluster_cell(&pixels, self.mode)
            }
        }
    }
}

/// Two stacked pixels: top shows as background, bottom as the `▄` ink.
pub fn half_block(top: Color, bottom: Color) -> Cell {
    if top == bottom {
        return Cell::solid(top);
    }
    Cell {
        fg: bottom,
        bg: top,
        glyph: Glyph::LowerHalf,
    }
}

/// Approximate a block with two colors and a glyph.
///
/// The block is split in two on its highest-variance channel; the lighter
/// half becomes the ink (foreground), the darker half the paper (background),
/// and the glyph is picked by how much of the block the lighter half covers.
pub fn cluster_cell(pixels: &[Color], mode: DitherMode) -> Cell {
    let Some(&first) = pixels.first() else {
        return Cell::default();
    };
    if pixels.iter().all(|&p| p == first) {
        return Cell::solid(first);
    }

    let linear: Vec<LinearRgb> = pixels.iter().map(|&p| p.to_linear()).collect();
    let Some(split) = TwoColorSplit::new(&linear) else {
        return Cell::solid(average(&linear).to_color());
    };

    let fg = split.ink.to_color();
    let bg = split.paper.to_color();
    if fg == bg {
        return Cell::solid(fg);
    }

    let glyph = match mode {
        DitherMode::Char => density_glyph(split.ink_share),
        _ => shade_glyph(&split),
    };
    Cell { fg, bg, glyph }
}

struct TwoColorSplit {
    ink: LinearRgb,
    paper: LinearRgb,
    /// Fraction of pixels that went to `ink`.
    ink_share: f32,
    mean: LinearRgb,
}

impl TwoColorSplit {
    fn new(pixels: &[LinearRgb]) -> Option<Self> {
        let mean = average(pixels);
        let n = pixels.len() as f32;

        // channel with the largest variance; earlier channels win ties
        let mut channel = 0;
        let mut best = -1.0f32;
        for c in 0..3 {
            let m = mean.channel(c);
            let var = pixels.iter().map(|p| (p.channel(c) - m).powi(2)).sum::<f32>() / n;
            if var > best {
                best = var;
                channel = c;
            }
        }

        let threshold = mean.channel(channel);
        let (upper, lower): (Vec<LinearRgb>, Vec<LinearRgb>) =
            pixels.iter().partition(|p| p.channel(channel) > threshold);
        if upper.is_empty() || lower.is_empty() {
            return None;
        }

        let upper_mean = average(&upper);
        let lower_mean = average(&lower);
        let (ink, paper, ink_count) =
            if Oklab::from(lower_mean).l > Oklab::from(upper_mean).l {
                (lower_mean, upper_mean, lower.len())
            } else {
                (upper_mean, lower_mean, upper.len())
            };

        Some(Self {
            ink,
            paper,
            ink_share: ink_count as f32 / n,
            mean,
        })
    }
}

fn average(pixels: &[LinearRgb]) -> LinearRgb {
    let sum = pixels
        .iter()
        .fold(LinearRgb::default(), |acc, &p| acc + p);
    sum * (1.0 / pixels.len().max(1) as f32)
}

/// Shade whose ink/paper mix lands perceptually closest to the block's mean.
fn shade_glyph(split: &TwoColorSplit) -> Glyph {
    let target = Oklab::from(split.mean);
    let candidates = std::iter::once((Glyph::Blank, 0.0))
        .chain(Shade::ALL.iter().map(|&s| (Glyph::Shade(s), s.coverage())));

    let mut best = (Glyph::Blank, f32::INFINITY);
    for (glyph, coverage) in candidates {
        let apparent = Oklab::from(split.paper.lerp(split.ink, coverage));
        let error = apparent.distance_squared(target);
        if error < best.1 {
            best = (glyph, error);
        }
    }
    best.0
}

/// Density character whose ink coverage is closest to `share`.
fn density_glyph(share: f32) -> Glyph {
    let steps = (DENSITY_RAMP.len() - 1) as f32;
    let mut best = (0, f32::INFINITY);
    for i in 0..DENSITY_RAMP.len() {
        let distance = (i as f32 / steps - share).abs();
        if distance < best.1 {
            best = (i, distance);
        }
    }
    match best.0 {
        0 => Glyph::Blank,
        i => Glyph::Ink(DENSITY_RAMP[i]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn block_with_white(white: usize) -> Vec<Color> {
        (0..32)
            .map(|i| if i < white { Color::WHITE } else { Color::BLACK })
            .collect()
    }

    fn patterned(width: u32, height: u32) -> Bitmap {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 53 + y * 7) as u8, (y * 91) as u8, (x * y * 13) as u8, 255])
        });
        Bitmap::from_rgba(img).unwrap()
    }

    #[test]
    fn test_half_block_layout() {
        let top = Color::new(255, 0, 0);
        let bottom = Color::new(0, 0, 255);
        let cell = half_block(top, bottom);
        assert_eq!(cell.bg, top);
        assert_eq!(cell.fg, bottom);
        assert_eq!(cell.glyph, Glyph::LowerHalf);
        assert_eq!(half_block(top, top), Cell::solid(top));
    }

    #[test]
    fn test_none_mode_only_uses_source_colors() {
        let bitmap = patterned(5, 6);
        let image = CellProcessor::new(DitherMode::None).process(&bitmap).unwrap();
        assert_eq!((image.width(), image.height()), (5, 3));
        for cy in 0..3u32 {
            for cx in 0..5u32 {
                let cell = image.get(cx as usize, cy as usize).unwrap();
                let sources = [bitmap.color(cx, cy * 2), bitmap.color(cx, cy * 2 + 1)];
                assert!(sources.contains(&cell.fg), "fg at {cx},{cy}");
                assert!(sources.contains(&cell.bg), "bg at {cx},{cy}");
            }
        }
    }

    #[test]
    fn test_uniform_bitmap_is_blank_in_every_mode() {
        let color = Color::new(33, 120, 240);
        for mode in [DitherMode::None, DitherMode::Block, DitherMode::Char] {
            let block = mode.block_factor();
            let bitmap = Bitmap::filled(3 * block.x, 2 * block.y, color).unwrap();
            let image = CellProcessor::new(mode).process(&bitmap).unwrap();
            assert_eq!((image.width(), image.height()), (3, 2));
            assert!(image.cells().iter().all(|c| *c == Cell::solid(color)), "{mode:?}");
        }
    }

    #[test]
    fn test_block_mode_shade_tracks_light_area() {
        let cases = [
            (8, Shade::Light),
            (16, Shade::Medium),
            (24, Shade::Dark),
        ];
        for (white, shade) in cases {
            let cell = cluster_cell(&block_with_white(white), DitherMode::Block);
            assert_eq!(cell.fg, Color::WHITE);
            assert_eq!(cell.bg, Color::BLACK);
            assert_eq!(cell.glyph, Glyph::Shade(shade), "{white} white pixels");
        }
    }

    #[test]
    fn test_char_mode_picks_closest_density() {
        // 8 of 32 lit = 0.25, nearest ramp step is 2/9
        let cell = cluster_cell(&block_with_white(8), DitherMode::Char);
        assert_eq!(cell.glyph, Glyph::Ink(':'));
        assert_eq!(cell.fg, Color::WHITE);

        // 31 of 32 lit is closest to a full '@'
        let cell = cluster_cell(&block_with_white(31), DitherMode::Char);
        assert_eq!(cell.glyph, Glyph::Ink('@'));
    }

    #[test]
    fn test_density_glyph_extremes() {
        assert_eq!(density_glyph(0.0), Glyph::Blank);
        assert_eq!(density_glyph(0.04), Glyph::Blank);
        assert_eq!(density_glyph(1.0), Glyph::Ink('@'));
    }

    #[test]
    fn test_ink_is_the_lighter_cluster() {
        // split runs on blue, so the dark blue pixels land above the threshold
        let blue = Color::new(0, 0, 255);
        let olive = Color::new(230, 230, 0);
        let pixels: Vec<Color> = (0..32).map(|i| if i < 4 { olive } else { blue }).collect();
        let cell = cluster_cell(&pixels, DitherMode::Block);
        assert_eq!(cell.fg, olive);
        assert_eq!(cell.bg, blue);
    }

    #[test]
    fn test_uneven_block_is_invariant_violation() {
        let bitmap = Bitmap::filled(3, 3, Color::WHITE).unwrap();
        let err = CellProcessor::new(DitherMode::None).process(&bitmap).unwrap_err();
        assert!(matches!(err, RenderError::RenderInvariantViolation(_)));

        let bitmap = Bitmap::filled(8, 8, Color::WHITE).unwrap();
        assert!(CellProcessor::new(DitherMode::Block).process(&bitmap).is_ok());
        let bitmap = Bitmap::filled(6, 8, Color::WHITE).unwrap();
        assert!(CellProcessor::new(DitherMode::Char).process(&bitmap).is_err());
    }

    #[test]
    fn test_processing_is_deterministic() {
        let bitmap = patterned(16, 24);
        let processor = CellProcessor::new(DitherMode::Block);
        assert_eq!(
            processor.process(&bitmap).unwrap(),
            processor.process(&bitmap).unwrap()
        );
    }
}
