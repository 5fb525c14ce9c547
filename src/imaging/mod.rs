//! Image processing: decode, scale, crop, diff.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader`, external converter for `.jxl` |
//! | **Fit to bounds** | [`fit_bounds`] + `DynamicImage::resize_exact` |
//! | **Slider crop** | [`reveal_left`] at full resolution, then fit |
//! | **Diff** | 16-bit per-channel deltas, amplified visualization, MAE |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Value types threaded through every call
//! - **Codec**: [`load_image`] and the converter fallback
//! - **Operations**: Scaling and cropping
//! - **Diff**: [`compute_diff`]
//!
//! Every function here is synchronous and allocates its own output, so
//! independent calls can run on any thread at the same time.

mod calculations;
pub mod codec;
pub mod diff;
pub mod operations;
mod params;

pub use calculations::{crop_cut_column, fit_bounds};
pub use codec::{DecodeError, load_image};
pub use diff::{DiffError, DiffOptions, DiffResult, DiffSummary, compute_diff};
pub use operations::{crop, fit_to_bounds, resize, reveal_left};
pub use params::{BoundingBox, CropRatio, ScalingAlgorithm};
