//! Immutable render configuration.
//!
//! Flags are validated once into a [`CellGridConfig`]; the pipeline only ever
//! sees it by shared reference.

use crate::color::Color;
use crate::error::RenderError;

/// How each block of pixels is turned into a cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DitherMode {
    /// Two stacked pixels per cell drawn with a half block.
    #[default]
    #[value(alias = "0")]
    None,
    /// 8x4 pixel blocks drawn with shade characters.
    #[value(alias = "1")]
    Block,
    /// 8x4 pixel blocks drawn with ASCII density characters.
    #[value(alias = "2")]
    Char,
}

impl DitherMode {
    pub fn block_factor(self) -> BlockFactor {
        match self {
            DitherMode::None => BlockFactor { x: 1, y: 2 },
            DitherMode::Block | DitherMode::Char => BlockFactor { x: 4, y: 8 },
        }
    }
}

/// How the source aspect ratio is treated when sizing to the grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ScaleMode {
    /// Stretch to the exact target size.
    #[default]
    Fill,
    /// Keep aspect ratio, letterbox with the matte color.
    Fit,
    /// Keep aspect ratio, cut the overflow around the center.
    Crop,
}

/// Which SGR color form the stream uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorMode {
    /// 24-bit `38;2;r;g;b`
    #[default]
    Truecolor,
    /// xterm palette `38;5;n`
    #[value(name = "256")]
    Ansi256,
}

/// Source pixels covered by one cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlockFactor {
    pub x: u32,
    pub y: u32,
}

impl BlockFactor {
    #[inline]
    pub fn area(self) -> usize {
        self.x as usize * self.y as usize
    }
}

/// Grid size in terminal cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GridSize {
    pub cols: u32,
    pub rows: u32,
}

/// Upper bound on render threads.
pub const MAX_WORKERS: usize = 1024;

/// Upper bound on `cols * rows * block area`, the scaler's output size.
pub const MAX_TARGET_PIXELS: u64 = 1 << 24;

#[derive(Debug, Clone, PartialEq)]
pub struct CellGridConfig {
    grid: GridSize,
    block: BlockFactor,
    matte: Color,
    scale: ScaleMode,
    dither: DitherMode,
    color_mode: ColorMode,
    workers: usize,
}

impl CellGridConfig {
    pub fn builder(cols: u32, rows: u32) -> CellGridConfigBuilder {
        CellGridConfigBuilder::new(cols, rows)
    }

    #[inline]
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    #[inline]
    pub fn block(&self) -> BlockFactor {
        self.block
    }

    #[inline]
    pub fn matte(&self) -> Color {
        self.matte
    }

    #[inline]
    pub fn scale(&self) -> ScaleMode {
        self.scale
    }

    #[inline]
    pub fn dither(&self) -> DitherMode {
        self.dither
    }

    #[inline]
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Pixel size the scaler has to produce: `cells * block factor`.
    pub fn target_pixels(&self) -> (u32, u32) {
        (self.grid.cols * self.block.x, self.grid.rows * self.block.y)
    }
}

/// Builder for [`CellGridConfig`]. Unset options take their defaults:
/// black matte, `fill` scaling, no dithering, truecolor, one worker per CPU.
#[derive(Debug, Clone)]
pub struct CellGridConfigBuilder {
    cols: u32,
    rows: u32,
    matte: Color,
    scale: ScaleMode,
    dither: DitherMode,
    color_mode: ColorMode,
    workers: Option<usize>,
}

impl CellGridConfigBuilder {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            matte: Color::BLACK,
            scale: ScaleMode::default(),
            dither: DitherMode::default(),
            color_mode: ColorMode::default(),
            workers: None,
        }
    }

    pub fn matte(mut self, matte: Color) -> Self {
        self.matte = matte;
        self
    }

    pub fn scale(mut self, scale: ScaleMode) -> Self {
        self.scale = scale;
        self
    }

    pub fn dither(mut self, dither: DitherMode) -> Self {
        self.dither = dither;
        self
    }

    pub fn color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn build(self) -> Result<CellGridConfig, RenderError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "cell grid must be at least 1x1 (got {}x{})",
                self.cols, self.rows
            )));
        }
        let workers = self
            .workers
            .unwrap_or_else(|| num_cpus::get().min(MAX_WORKERS));
        if workers == 0 || workers > MAX_WORKERS {
            return Err(RenderError::InvalidConfig(format!(
                "worker count must be between 1 and {MAX_WORKERS} (got {workers})"
            )));
        }

        let block = self.dither.block_factor();
        let width = u64::from(self.cols) * u64::from(block.x);
        let height = u64::from(self.rows) * u64::from(block.y);
        if width > u64::from(u32::MAX)
            || height > u64::from(u32::MAX)
            || width * height > MAX_TARGET_PIXELS
        {
            return Err(RenderError::InvalidConfig(format!(
                "{}x{} cells needs {width}x{height} pixels (limit {MAX_TARGET_PIXELS})",
                self.cols, self.rows
            )));
        }

        Ok(CellGridConfig {
            grid: GridSize {
                cols: self.cols,
                rows: self.rows,
            },
            block,
            matte: self.matte,
            scale: self.scale,
            dither: self.dither,
            color_mode: self.color_mode,
            workers,
        })
    }
}
