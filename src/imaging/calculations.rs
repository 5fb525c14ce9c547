//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{BoundingBox, CropRatio};

/// Calculate display dimensions that fit `(width, height)` inside `bbox`.
///
/// Images already inside the box are returned unchanged (no upscaling).
/// Otherwise the axis that overflows the most is the binding constraint: it
/// lands exactly on its box bound and the other axis is scaled by the same
/// factor, truncated. The arithmetic is done in integers so exact ratios
/// (square images, exact multiples) come out exact. The result is never
/// smaller than 1×1.
///
/// # Examples
/// ```
/// # use imgcomp::imaging::{BoundingBox, fit_bounds};
/// // 800x600 into 400x400 → width binds → 400x300
/// assert_eq!(fit_bounds(800, 600, BoundingBox::new(400, 400)), (400, 300));
///
/// // Already fits → unchanged
/// assert_eq!(fit_bounds(320, 200, BoundingBox::new(400, 400)), (320, 200));
/// ```
pub fn fit_bounds(width: u32, height: u32, bbox: BoundingBox) -> (u32, u32) {
    if bbox.contains(width, height) {
        return (width, height);
    }

    let (w, h) = (u64::from(width), u64::from(height));
    let (max_w, max_h) = (u64::from(bbox.max_width), u64::from(bbox.max_height));

    // w / max_w > h / max_h, cross-multiplied
    if w * max_h > h * max_w {
        let scaled_h = clamp_dim(h * max_w / w, bbox.max_height);
        (bbox.max_width, scaled_h)
    } else {
        let scaled_w = clamp_dim((w * max_h).checked_div(h).unwrap_or(0), bbox.max_width);
        (scaled_w, bbox.max_height)
    }
}

fn clamp_dim(value: u64, max: u32) -> u32 {
    u32::try_from(value).unwrap_or(max).min(max).max(1)
}

/// Column where the slider cut falls: `floor(width * ratio)`.
///
/// Columns `[0, cut)` stay visible, `[cut, width)` are blanked.
pub fn crop_cut_column(width: u32, ratio: CropRatio) -> u32 {
    ((width as f64 * ratio.value()).floor() as u32).min(width)
}
