use crate::color::Color;
use crate::error::RenderError;

/// Shade characters used by block dithering, lightest ink first.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shade {
    Light,
    Medium,
    Dark,
    Full,
}

impl Shade {
    pub const ALL: [Shade; 4] = [Shade::Light, Shade::Medium, Shade::Dark, Shade::Full];

    pub fn as_char(self) -> char {
        match self {
            Shade::Light => '░',
            Shade::Medium => '▒',
            Shade::Dark => '▓',
            Shade::Full => '█',
        }
    }

    /// Fraction of the cell painted in the foreground color.
    pub fn coverage(self) -> f32 {
        match self {
            Shade::Light => 0.25,
            Shade::Medium => 0.5,
            Shade::Dark => 0.75,
            Shade::Full => 1.0,
        }
    }
}

/// What gets printed in a cell, which decides how its two colors show.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Glyph {
    /// A space: only the background is visible.
    Blank,
    /// `▄`: background on top, foreground on the bottom half.
    LowerHalf,
    Shade(Shade),
    /// An ASCII density character drawn in the foreground color.
    Ink(char),
}

impl Glyph {
    pub fn as_char(self) -> char {
        match self {
            Glyph::Blank => ' ',
            Glyph::LowerHalf => '▄',
            Glyph::Shade(shade) => shade.as_char(),
            Glyph::Ink(c) => c,
        }
    }

    /// Whether the foreground color is visible at all.
    pub fn uses_foreground(self) -> bool {
        !matches!(self, Glyph::Blank)
    }
}

/// One terminal position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub fg: Color,
    pub bg: Color,
    pub glyph: Glyph,
}

impl Cell {
    /// A cell showing just `color`.
    pub fn solid(color: Color) -> Self {
        Self {
            fg: color,
            bg: color,
            glyph: Glyph::Blank,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::solid(Color::BLACK)
    }
}

/// Row-major grid of cells, the dither engine's output.
#[derive(Clone, PartialEq, Debug)]
pub struct AnsiImage {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl AnsiImage {
    pub fn new(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self, RenderError> {
        if width == 0 || height == 0 || cells.len() != width * height {
            return Err(RenderError::RenderInvariantViolation(format!(
                "{} cells cannot form a {width}x{height} grid",
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        Some(&self.cells[y * self.width..(y + 1) * self.width])
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        self.row(y)?.get(x)
    }
}
