//! Resample a bitmap to the pixel size the cell grid needs.
//!
//! Resampling is separable. Along each axis the filter depends on direction:
//! shrinking averages the covered source area, enlarging interpolates
//! bilinearly between pixel centers. Color math runs in linear light and every
//! weight set is normalized, so a flat color stays exactly flat.

use image::{imageops, Rgba, RgbaImage};
use rayon::prelude::*;
use tracing::debug;

use crate::color::{linear_to_srgb, srgb_to_linear, Color};
use crate::core::config::{BlockFactor, CellGridConfig, ScaleMode};
use crate::decoder::Bitmap;
use crate::error::RenderError;

/// Scale `bitmap` to `config.target_pixels()` under the configured scale mode.
pub fn scale(bitmap: &Bitmap, config: &CellGridConfig) -> Result<Bitmap, RenderError> {
    let (width, height) = config.target_pixels();
    scale_to(
        bitmap,
        width,
        height,
        config.block(),
        config.scale(),
        config.matte(),
    )
}

/// Scale to `width x height`, each rounded to the nearest multiple of `block`.
pub fn scale_to(
    bitmap: &Bitmap,
    width: u32,
    height: u32,
    block: BlockFactor,
    mode: ScaleMode,
    matte: Color,
) -> Result<Bitmap, RenderError> {
    let width = round_to_block(width, block.x)?;
    let height = round_to_block(height, block.y)?;
    let src = bitmap.as_rgba();

    let out = match mode {
        ScaleMode::Fill => resample(src, width, height)?,
        ScaleMode::Fit => {
            let (inner_w, inner_h) = fit_size(src.width(), src.height(), width, height);
            let inner = resample(src, inner_w, inner_h)?;
            let mut canvas =
                RgbaImage::from_pixel(width, height, Rgba([matte.r, matte.g, matte.b, 255]));
            let x = (width - inner_w) / 2;
            let y = (height - inner_h) / 2;
            imageops::replace(&mut canvas, &inner, x as i64, y as i64);
            canvas
        }
        ScaleMode::Crop => {
            let (x, y, w, h) = crop_rect(src.width(), src.height(), width, height);
            let view = imageops::crop_imm(src, x, y, w, h).to_image();
            resample(&view, width, height)?
        }
    };

    debug!(
        from = ?(src.width(), src.height()),
        to = ?(width, height),
        ?mode,
        "scaled bitmap"
    );
    Bitmap::from_rgba(out)
}

/// Nearest multiple of `factor`, never less than one block. Zero is rejected.
pub fn round_to_block(value: u32, factor: u32) -> Result<u32, RenderError> {
    if value == 0 || factor == 0 {
        return Err(RenderError::InvalidConfig(format!(
            "cannot scale to a zero dimension (size {value}, block {factor})"
        )));
    }
    let factor64 = factor as u64;
    let rounded = ((value as u64 + factor64 / 2) / factor64 * factor64).max(factor64);
    u32::try_from(rounded)
        .map_err(|_| RenderError::InvalidConfig(format!("target size {value} is too large")))
}

/// Largest size with the source aspect ratio that fits inside the target.
fn fit_size(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32) {
    let scale = (dst_w as f64 / src_w as f64).min(dst_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, dst_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, dst_h);
    (w, h)
}

/// Centered source region with the target aspect ratio: `(x, y, w, h)`.
fn crop_rect(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32, u32, u32) {
    let scale = (dst_w as f64 / src_w as f64).max(dst_h as f64 / src_h as f64);
    let w = ((dst_w as f64 / scale).round() as u32).clamp(1, src_w);
    let h = ((dst_h as f64 / scale).round() as u32).clamp(1, src_h);
    ((src_w - w) / 2, (src_h - h) / 2, w, h)
}

type Taps = Vec<(usize, f32)>;

/// Source taps for every destination index along one axis.
fn axis_weights(src_len: u32, dst_len: u32) -> Vec<Taps> {
    let src_len = src_len as usize;
    let dst_len = dst_len as usize;

    if src_len == dst_len {
        return (0..dst_len).map(|i| vec![(i, 1.0)]).collect();
    }

    let ratio = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|i| {
            let mut taps: Taps = Vec::new();
            if dst_len < src_len {
                // area average over [start, end)
                let start = i as f64 * ratio;
                let end = (i + 1) as f64 * ratio;
                let first = start.floor() as usize;
                let last = (end.ceil() as usize).min(src_len);
                for j in first..last {
                    let overlap = end.min((j + 1) as f64) - start.max(j as f64);
                    if overlap > 0.0 {
                        taps.push((j, overlap as f32));
                    }
                }
            } else {
                // bilinear between pixel centers, clamped at the edges
                let pos = ((i as f64 + 0.5) * ratio - 0.5).clamp(0.0, (src_len - 1) as f64);
                let j0 = pos.floor() as usize;
                let j1 = (j0 + 1).min(src_len - 1);
                let t = (pos - j0 as f64) as f32;
                if j0 == j1 || t == 0.0 {
                    taps.push((j0, 1.0));
                } else {
                    taps.push((j0, 1.0 - t));
                    taps.push((j1, t));
                }
            }

            let total: f32 = taps.iter().map(|&(_, w)| w).sum();
            for tap in &mut taps {
                tap.1 /= total;
            }
            taps
        })
        .collect()
}

fn resample(src: &RgbaImage, dst_w: u32, dst_h: u32) -> Result<RgbaImage, RenderError> {
    if src.width() == dst_w && src.height() == dst_h {
        return Ok(src.clone());
    }

    let src_w = src.width() as usize;
    let out_w = dst_w as usize;
    let cols = axis_weights(src.width(), dst_w);
    let rows = axis_weights(src.height(), dst_h);

    let linear: Vec<[f32; 4]> = src
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            [
                srgb_to_linear(r),
                srgb_to_linear(g),
                srgb_to_linear(b),
                a as f32 / 255.0,
            ]
        })
        .collect();

    // horizontal pass: every source row, destination width
    let mut horizontal = vec![[0.0f32; 4]; out_w * src.height() as usize];
    horizontal
        .par_chunks_mut(out_w)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &linear[y * src_w..(y + 1) * src_w];
            for (x, out) in row.iter_mut().enumerate() {
                *out = accumulate(cols[x].iter().map(|&(sx, w)| (&src_row[sx], w)));
            }
        });

    // vertical pass straight into 8-bit output
    let mut bytes = vec![0u8; out_w * dst_h as usize * 4];
    bytes
        .par_chunks_mut(out_w * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.chunks_exact_mut(4).enumerate() {
                let taps = rows[y].iter().map(|&(sy, w)| (&horizontal[sy * out_w + x], w));
                let px = accumulate(taps);
                out[0] = linear_to_srgb(px[0]);
                out[1] = linear_to_srgb(px[1]);
                out[2] = linear_to_srgb(px[2]);
                out[3] = (px[3] * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        });

    RgbaImage::from_raw(dst_w, dst_h, bytes).ok_or_else(|| {
        RenderError::RenderInvariantViolation(format!(
            "resampled buffer does not match {dst_w}x{dst_h}"
        ))
    })
}

#[inline]
fn accumulate<'a>(taps: impl Iterator<Item = (&'a [f32; 4], f32)>) -> [f32; 4] {
    let mut acc = [0.0f32; 4];
    for (px, w) in taps {
        for (slot, v) in acc.iter_mut().zip(px) {
            *slot += v * w;
        }
    }
    acc
}
