use std::fmt;

use tracing::debug;

use super::config::CellGridConfig;
use crate::decoder::Bitmap;
use crate::error::RenderError;
use crate::renderer::{matte, scaler, AnsiImage, CellGridRenderer, CellProcessor};

/// Where a render currently is. Stages only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Decoded,
    Matted,
    Scaled,
    Dithered,
    Rendered,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Decoded => "decoded",
            Stage::Matted => "matted",
            Stage::Scaled => "scaled",
            Stage::Dithered => "dithered",
            Stage::Rendered => "rendered",
        };
        f.write_str(name)
    }
}

/// Decoded bitmap in, escape stream out.
///
/// Each step only reads the previous step's output and the config; the first
/// error ends the run and nothing is returned.
pub struct Pipeline<'a> {
    config: &'a CellGridConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a CellGridConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, bitmap: Bitmap) -> Result<Vec<u8>, RenderError> {
        let image = self.dither(bitmap)?;
        let stream = CellGridRenderer::from_config(self.config).render(&image)?;
        debug!(stage = %Stage::Rendered, bytes = stream.len());
        Ok(stream)
    }

    /// Run up to and including the dither engine.
    pub fn dither(&self, bitmap: Bitmap) -> Result<AnsiImage, RenderError> {
        trace_bitmap(Stage::Decoded, &bitmap);

        let matted = if bitmap.is_opaque() {
            bitmap
        } else {
            matte::composite(&bitmap, self.config.matte())
        };
        trace_bitmap(Stage::Matted, &matted);

        let scaled = scaler::scale(&matted, self.config)?;
        trace_bitmap(Stage::Scaled, &scaled);

        let image = CellProcessor::from_config(self.config).process(&scaled)?;
        debug!(
            stage = %Stage::Dithered,
            cols = image.width(),
            rows = image.height()
        );
        Ok(image)
    }
}

fn trace_bitmap(stage: Stage, bitmap: &Bitmap) {
    debug!(
        stage = %stage,
        width = bitmap.width(),
        height = bitmap.height()
    );
}
