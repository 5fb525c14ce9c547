//! Pixel-wise difference between two images.
//!
//! The first image defines the canonical frame. If the second has different
//! dimensions it is resized to match, using the session's
//! [`ScalingAlgorithm`], before any pixels are compared. The comparison is
//! therefore not symmetric for mismatched sizes: `diff(a, b)` resamples `b`
//! while `diff(b, a)` resamples `a`.
//!
//! ## Per-pixel arithmetic
//!
//! ```text
//! c16    = premultiplied 16-bit channel (8-bit input widened ×257)
//! delta  = |c16(a) - c16(b)| >> 8          truncated, never rounded
//! shown  = min(delta × amplification, 255) alpha always 255
//! total += delta_r + delta_g + delta_b     unamplified
//! mae    = total / (pixels × 3)
//! ```
//!
//! In monochrome mode `shown` is black when all three deltas are zero and
//! [`HIGHLIGHT`] otherwise, whatever the magnitude.

use super::params::ScalingAlgorithm;
use image::imageops;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba, RgbaImage};
use serde::Serialize;
use thiserror::Error;

/// Default multiplier applied to raw deltas before clamping.
pub const AMPLIFICATION: f64 = 5.0;

/// Colour used for every differing pixel in monochrome mode.
pub const HIGHLIGHT: Rgba<u8> = Rgba([240, 0, 0, 255]);

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DiffError {
    #[error("cannot compare an image with no pixels")]
    EmptyBounds,
}

/// How a diff is computed and rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffOptions {
    /// Resampler used when the second image has to be brought to the first's size.
    pub algorithm: ScalingAlgorithm,
    /// Collapse the visualization to black / [`HIGHLIGHT`].
    pub monochrome: bool,
    pub amplification: f64,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            algorithm: ScalingAlgorithm::default(),
            monochrome: false,
            amplification: AMPLIFICATION,
        }
    }
}

/// Outcome of [`compute_diff`].
#[derive(Debug, Clone)]
pub struct DiffResult {
    /// Amplified difference swatch, same size as the first image.
    pub visualization: RgbaImage,
    /// Average per-channel delta over every pixel, in `[0, 255]`.
    pub mean_absolute_error: f64,
    /// Pixels visited: width × height of the canonical frame.
    pub pixel_count: u64,
}

impl DiffResult {
    pub fn is_identical(&self) -> bool {
        self.mean_absolute_error == 0.0
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            mean_absolute_error: self.mean_absolute_error,
            pixel_count: self.pixel_count,
            identical: self.is_identical(),
        }
    }
}

/// The scalar part of a [`DiffResult`], for reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiffSummary {
    pub mean_absolute_error: f64,
    pub pixel_count: u64,
    pub identical: bool,
}

/// Premultiply a straight-alpha 16-bit channel.
#[inline]
fn premultiply(channel: u16, alpha: u16) -> u32 {
    channel as u32 * alpha as u32 / 0xffff
}

#[inline]
fn channel_deltas(a: &Rgba<u16>, b: &Rgba<u16>) -> [u32; 3] {
    let [ar, ag, ab, aa] = a.0;
    let [br, bg, bb, ba] = b.0;
    [
        premultiply(ar, aa).abs_diff(premultiply(br, ba)) >> 8,
        premultiply(ag, aa).abs_diff(premultiply(bg, ba)) >> 8,
        premultiply(ab, aa).abs_diff(premultiply(bb, ba)) >> 8,
    ]
}

#[inline]
fn amplify(delta: u32, factor: f64) -> u8 {
    (delta as f64 * factor).min(255.0) as u8
}

/// Bring `b` onto `a`'s frame, resizing only when the dimensions differ.
fn reconcile(b: &DynamicImage, width: u32, height: u32, algorithm: ScalingAlgorithm) -> Rgba16Image {
    let b16 = b.to_rgba16();
    if b16.dimensions() == (width, height) {
        return b16;
    }
    log::debug!(
        "resizing second image {}x{} → {width}x{height} ({algorithm})",
        b16.width(),
        b16.height()
    );
    imageops::resize(&b16, width, height, algorithm.filter())
}

/// Compare `a` against `b` pixel by pixel.
///
/// Neither input is modified. Fails only when `a` has no pixels.
pub fn compute_diff(
    a: &DynamicImage,
    b: &DynamicImage,
    options: &DiffOptions,
) -> Result<DiffResult, DiffError> {
    let (width, height) = a.dimensions();
    if width == 0 || height == 0 {
        return Err(DiffError::EmptyBounds);
    }

    let a16 = a.to_rgba16();
    let b16 = reconcile(b, width, height, options.algorithm);

    let mut visualization = RgbaImage::new(width, height);
    let mut total_diff: u64 = 0;
    let mut pixel_count: u64 = 0;

    for ((out, pa), pb) in visualization
        .pixels_mut()
        .zip(a16.pixels())
        .zip(b16.pixels())
    {
        let [dr, dg, db] = channel_deltas(pa, pb);

        *out = if options.monochrome {
            if dr == 0 && dg == 0 && db == 0 {
                BLACK
            } else {
                HIGHLIGHT
            }
        } else {
            Rgba([
                amplify(dr, options.amplification),
                amplify(dg, options.amplification),
                amplify(db, options.amplification),
                255,
            ])
        };

        total_diff += u64::from(dr + dg + db);
        pixel_count += 1;
    }

    let mean_absolute_error = total_diff as f64 / (pixel_count * 3) as f64;

    Ok(DiffResult {
        visualization,
        mean_absolute_error,
        pixel_count,
    })
}
