//! Parameter types for image operations.
//!
//! These are small `Copy` values threaded through every transform in a
//! comparison session. None of them own pixel data.
//!
//! ## Types
//!
//! - [`ScalingAlgorithm`]: Interpolation used for every resize in a session (bilinear or nearest).
//! - [`BoundingBox`]: Maximum display/processing dimensions (400×400 by default).
//! - [`CropRatio`]: Slider position in `[0, 1]`. Clamped on construction.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interpolation algorithm for resizing.
///
/// Selected once at startup and used for both images of a comparison so the
/// two sides never pick up different resampling artifacts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ScalingAlgorithm {
    /// Averages the nearest source samples. Smooth, the default.
    #[default]
    Bilinear,
    /// Picks the single closest source sample. Keeps hard edges for pixel art.
    Nearest,
}

impl ScalingAlgorithm {
    /// The `image` resampling filter implementing this algorithm.
    pub fn filter(self) -> FilterType {
        match self {
            ScalingAlgorithm::Bilinear => FilterType::Triangle,
            ScalingAlgorithm::Nearest => FilterType::Nearest,
        }
    }
}

impl fmt::Display for ScalingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalingAlgorithm::Bilinear => f.write_str("bilinear"),
            ScalingAlgorithm::Nearest => f.write_str("nearest"),
        }
    }
}

/// Maximum width and height an image is scaled into for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoundingBox {
    pub max_width: u32,
    pub max_height: u32,
}

impl BoundingBox {
    pub const fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// Whether `(width, height)` already fits without scaling.
    pub fn contains(self, width: u32, height: u32) -> bool {
        width <= self.max_width && height <= self.max_height
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(400, 400)
    }
}

/// Horizontal crop position for the slider view (0.0–1.0).
///
/// `0.0` hides the whole image, `1.0` keeps all of it. Out-of-range and NaN
/// inputs are clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRatio(f64);

impl CropRatio {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for CropRatio {
    /// Slider starts in the middle.
    fn default() -> Self {
        Self(0.5)
    }
}
