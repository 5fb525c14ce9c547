//! Scaling and slider cropping.
//!
//! These functions combine the dimension math in
//! [`calculations`](super::calculations) with the `image` crate's resamplers.
//! Every function returns a fresh image and leaves its input untouched.

use super::calculations::{crop_cut_column, fit_bounds};
use super::params::{BoundingBox, CropRatio, ScalingAlgorithm};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Resize to exactly `width`×`height` with the given algorithm.
///
/// Aspect ratio is not preserved; pair with [`fit_bounds`] for display
/// sizing. Zero dimensions are raised to 1.
pub fn resize(
    image: &DynamicImage,
    width: u32,
    height: u32,
    algorithm: ScalingAlgorithm,
) -> DynamicImage {
    image.resize_exact(width.max(1), height.max(1), algorithm.filter())
}

/// Scale `image` down to fit inside `bbox`, preserving aspect ratio.
///
/// Images that already fit are copied without resampling.
pub fn fit_to_bounds(
    image: &DynamicImage,
    bbox: BoundingBox,
    algorithm: ScalingAlgorithm,
) -> DynamicImage {
    let (w, h) = image.dimensions();
    let (target_w, target_h) = fit_bounds(w, h, bbox);
    if (target_w, target_h) == (w, h) {
        return image.clone();
    }
    log::debug!("scaling {w}x{h} → {target_w}x{target_h} ({algorithm})");
    resize(image, target_w, target_h, algorithm)
}

/// Full-resolution slider frame: columns left of the cut are copied from
/// `image`, the rest are transparent. Output has the same size as the input.
pub fn reveal_left(image: &DynamicImage, ratio: CropRatio) -> RgbaImage {
    let src = image.to_rgba8();
    let (w, h) = src.dimensions();
    let cut = crop_cut_column(w, ratio);

    RgbaImage::from_fn(w, h, |x, y| {
        if x < cut {
            *src.get_pixel(x, y)
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Slider crop: [`reveal_left`] at full resolution, then [`fit_to_bounds`].
///
/// Cropping before scaling keeps the cut boundary sharp after downscaling.
pub fn crop(
    image: &DynamicImage,
    ratio: CropRatio,
    bbox: BoundingBox,
    algorithm: ScalingAlgorithm,
) -> DynamicImage {
    let revealed = DynamicImage::ImageRgba8(reveal_left(image, ratio));
    fit_to_bounds(&revealed, bbox, algorithm)
}
