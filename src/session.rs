//! Comparison session: the two images under comparison and the settings they
//! are compared with.
//!
//! A [`ComparisonSession`] is an explicit context object. It owns the loaded
//! images, the scaling algorithm and the display bounds, and hands them to the
//! stateless functions in [`imaging`](crate::imaging). Callers own the
//! session's lifecycle; nothing here is global.
//!
//! ## Loading
//!
//! [`load_pair`](ComparisonSession::load_pair) decodes both images in parallel
//! with `rayon::join` and only updates the session once both have succeeded.
//! Each [`LoadedImage`] keeps the full-resolution pixels (used for the diff)
//! and a preview scaled into the bounding box (used for the slider).
//!
//! ## Slider
//!
//! The slider overlays a cropped preview of the second image on the preview of
//! the first: columns left of the cut show the second image, the rest show the
//! first.

use crate::imaging::{
    self, BoundingBox, CropRatio, DecodeError, DiffError, DiffOptions, DiffResult,
    ScalingAlgorithm, fit_to_bounds,
};
use crate::ignore_log::IgnoreLog;
use crate::tools::{Converter, ToolError, TrashService};
use image::{DynamicImage, GenericImageView, RgbaImage, imageops};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Diff(#[from] DiffError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} image is not loaded")]
    NotLoaded(Side),
}

/// Which of the two compared images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => f.write_str("first"),
            Side::Second => f.write_str("second"),
        }
    }
}

/// Settings fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub algorithm: ScalingAlgorithm,
    pub bounds: BoundingBox,
    pub amplification: f64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            algorithm: ScalingAlgorithm::default(),
            bounds: BoundingBox::default(),
            amplification: imaging::diff::AMPLIFICATION,
        }
    }
}

impl From<&crate::config::AppConfig> for SessionOptions {
    fn from(config: &crate::config::AppConfig) -> Self {
        Self {
            algorithm: config.scaling_algorithm,
            bounds: config.bounds,
            amplification: config.diff.amplification,
        }
    }
}

/// A decoded image plus what the display needs to know about it.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    /// Full-resolution pixels.
    pub image: DynamicImage,
    /// `image` scaled into the session's bounding box.
    pub preview: DynamicImage,
    /// Size on disk in bytes.
    pub file_size: u64,
}

impl LoadedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Decode `path` and build its preview.
fn load_entry(
    path: &Path,
    converter: &dyn Converter,
    options: &SessionOptions,
) -> Result<LoadedImage, SessionError> {
    let image = imaging::load_image(path, converter)?;
    let file_size = std::fs::metadata(path)?.len();
    let preview = fit_to_bounds(&image, options.bounds, options.algorithm);
    log::info!(
        "loaded {} ({}x{}, {} bytes)",
        path.display(),
        image.width(),
        image.height(),
        file_size
    );
    Ok(LoadedImage {
        path: path.to_path_buf(),
        image,
        preview,
        file_size,
    })
}

/// Two images under comparison and the settings used to compare them.
pub struct ComparisonSession<C: Converter> {
    options: SessionOptions,
    converter: C,
    first: Option<LoadedImage>,
    second: Option<LoadedImage>,
}

impl<C: Converter> ComparisonSession<C> {
    pub fn new(options: SessionOptions, converter: C) -> Self {
        Self {
            options,
            converter,
            first: None,
            second: None,
        }
    }

    pub fn image(&self, side: Side) -> Option<&LoadedImage> {
        match side {
            Side::First => self.first.as_ref(),
            Side::Second => self.second.as_ref(),
        }
    }

    fn require(&self, side: Side) -> Result<&LoadedImage, SessionError> {
        self.image(side).ok_or(SessionError::NotLoaded(side))
    }

    /// Load (or replace) one side.
    pub fn load(&mut self, side: Side, path: &Path) -> Result<&LoadedImage, SessionError> {
        let entry = load_entry(path, &self.converter, &self.options)?;
        let slot = match side {
            Side::First => &mut self.first,
            Side::Second => &mut self.second,
        };
        Ok(&*slot.insert(entry))
    }

    /// Load both sides in parallel. On any failure the session is unchanged.
    pub fn load_pair(&mut self, first: &Path, second: &Path) -> Result<(), SessionError> {
        let converter = &self.converter;
        let options = &self.options;
        let (a, b) = rayon::join(
            || load_entry(first, converter, options),
            || load_entry(second, converter, options),
        );
        let (a, b) = (a?, b?);
        self.first = Some(a);
        self.second = Some(b);
        Ok(())
    }

    /// Diff the full-resolution images. The first image is the canonical frame.
    pub fn compare(&self, monochrome: bool) -> Result<DiffResult, SessionError> {
        let first = self.require(Side::First)?;
        let second = self.require(Side::Second)?;

        let options = DiffOptions {
            algorithm: self.options.algorithm,
            monochrome,
            amplification: self.options.amplification,
        };

        let started = Instant::now();
        let result = imaging::compute_diff(&first.image, &second.image, &options)?;
        log::info!("image difference computed in {:?}", started.elapsed());
        Ok(result)
    }

    /// The second image's preview, cropped at `ratio` and fitted to the bounds.
    pub fn slider_crop(&self, ratio: CropRatio) -> Result<DynamicImage, SessionError> {
        let second = self.require(Side::Second)?;
        Ok(imaging::crop(
            &second.preview,
            ratio,
            self.options.bounds,
            self.options.algorithm,
        ))
    }

    /// Slider frame: [`slider_crop`](Self::slider_crop) drawn over the first
    /// image's preview.
    pub fn slider_frame(&self, ratio: CropRatio) -> Result<RgbaImage, SessionError> {
        let first = self.require(Side::First)?;
        let mut frame = first.preview.to_rgba8();
        let overlay = self.slider_crop(ratio)?.to_rgba8();
        imageops::overlay(&mut frame, &overlay, 0, 0);
        Ok(frame)
    }

    /// Record the current pair in the ignore log.
    pub fn ignore(&self, log: &IgnoreLog) -> Result<(), SessionError> {
        let first = self.require(Side::First)?;
        let second = self.require(Side::Second)?;
        log.append(&first.path, &second.path)?;
        Ok(())
    }

    /// Delete one side's file and drop it from the session.
    pub fn delete(
        &mut self,
        side: Side,
        trash: Option<&dyn TrashService>,
    ) -> Result<PathBuf, SessionError> {
        let path = self.require(side)?.path.clone();
        delete_image(&path, trash)?;
        match side {
            Side::First => self.first = None,
            Side::Second => self.second = None,
        }
        Ok(path)
    }
}

/// Delete a file, through `trash` when given, otherwise by unlinking it.
///
/// Not retried; the first error is returned.
pub fn delete_image(path: &Path, trash: Option<&dyn TrashService>) -> Result<(), SessionError> {
    match trash {
        Some(trash) => {
            trash.move_to_trash(path)?;
            log::info!("moved {} to trash via {}", path.display(), trash.name());
        }
        None => {
            std::fs::remove_file(path)?;
            log::info!("removed {}", path.display());
        }
    }
    Ok(())
}
