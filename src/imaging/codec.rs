//! Image decoding.
//!
//! ## Crate mapping
//!
//! | Input | Path |
//! |---|---|
//! | JPEG, PNG, TIFF, WebP, GIF, BMP | `image` crate decoders, format sniffed from content |
//! | JPEG XL (`.jxl`) | external [`Converter`] → sibling temporary PNG → `image` |
//!
//! The JPEG XL path writes `<path>.converted.png` next to the source and
//! removes it again whether or not decoding succeeds. Animated formats decode
//! to their first frame only.

use crate::tools::{Converter, ToolError};
use image::{DynamicImage, ImageReader};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONVERTED_SUFFIX: &str = ".converted.png";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("image not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("cannot decode {}: {reason}", path.display())]
    InvalidFormat { path: PathBuf, reason: String },
    #[error("'{0}' is required to decode this image but was not found")]
    ToolUnavailable(String),
    #[error("conversion failed: {0}")]
    ToolFailed(#[source] ToolError),
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn is_jxl(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jxl"))
}

/// Sibling path the converter writes its PNG to.
fn converted_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(CONVERTED_SUFFIX);
    PathBuf::from(name)
}

/// Removes the wrapped file when dropped.
///
/// Created before the converter runs so a half-written output is cleaned up
/// on every exit path.
struct TempFile(PathBuf);

impl TempFile {
    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => log::debug!("removed temporary {}", self.0.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("could not remove temporary {}: {}", self.0.display(), e),
        }
    }
}

/// Load and decode an image from disk.
///
/// `.jxl` files go through `converter`; its availability is checked before
/// anything is written. Everything else is decoded directly.
pub fn load_image(path: &Path, converter: &dyn Converter) -> Result<DynamicImage, DecodeError> {
    if is_jxl(path) {
        return load_via_converter(path, converter);
    }
    decode_file(path)
}

fn load_via_converter(path: &Path, converter: &dyn Converter) -> Result<DynamicImage, DecodeError> {
    if !converter.is_available() {
        return Err(DecodeError::ToolUnavailable(converter.name().to_string()));
    }
    if !path.exists() {
        return Err(DecodeError::NotFound(path.to_path_buf()));
    }

    let temp = TempFile(converted_path(path));
    log::info!("converting {} with {}", path.display(), converter.name());
    converter
        .convert(path, temp.path())
        .map_err(DecodeError::ToolFailed)?;

    decode_file(temp.path())
}

/// Decode a file with the `image` crate, sniffing the format from its bytes.
fn decode_file(path: &Path) -> Result<DynamicImage, DecodeError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DecodeError::NotFound(path.to_path_buf()),
            _ => DecodeError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

    let img = reader.decode().map_err(|e| DecodeError::InvalidFormat {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::InvalidFormat {
            path: path.to_path_buf(),
            reason: "image has no pixels".to_string(),
        });
    }

    log::debug!("decoded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient, write_png};
    use crate::tools::tests::{ConvertBehavior, MockConverter};
    use image::GenericImageView;

    #[test]
    fn loads_png_directly_without_converter() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_png(tmp.path(), "a.png", &gradient(64, 48));
        let converter = MockConverter::unavailable();

        let img = load_image(&path, &converter).unwrap();
        assert_eq!(img.dimensions(), (64, 48));
        assert!(converter.get_calls().is_empty());
    }

    #[test]
    fn format_is_sniffed_not_taken_from_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let png = write_png(tmp.path(), "a.png", &gradient(10, 10));
        let misnamed = tmp.path().join("really-a-png.jpg");
        std::fs::rename(&png, &misnamed).unwrap();

        let img = load_image(&misnamed, &MockConverter::unavailable()).unwrap();
        assert_eq!(img.dimensions(), (10, 10));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_image(
            Path::new("/nonexistent/image.png"),
            &MockConverter::unavailable(),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::NotFound(_)));
    }

    #[test]
    fn corrupt_bytes_are_invalid_format() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let err = load_image(&path, &MockConverter::unavailable()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFormat { .. }));
    }

    #[test]
    fn jxl_decodes_through_converter_and_cleans_up() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo.jxl");
        std::fs::write(&source, b"jxl bytes").unwrap();
        let converter = MockConverter::new(ConvertBehavior::WritePng(gradient(32, 16)));

        let img = load_image(&source, &converter).unwrap();
        assert_eq!(img.dimensions(), (32, 16));

        let calls = converter.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, source);
        assert_eq!(calls[0].1, tmp.path().join("photo.jxl.converted.png"));
        assert!(!calls[0].1.exists(), "temporary PNG should be removed");
    }

    #[test]
    fn jxl_extension_is_case_insensitive() {
        assert!(is_jxl(Path::new("a.JXL")));
        assert!(!is_jxl(Path::new("a.jxl.png")));
    }

    #[test]
    fn jxl_without_converter_is_tool_unavailable_and_writes_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo.jxl");
        std::fs::write(&source, b"jxl bytes").unwrap();
        let converter = MockConverter::unavailable();

        let err = load_image(&source, &converter).unwrap_err();
        assert!(matches!(err, DecodeError::ToolUnavailable(ref t) if t == "mock-djxl"));
        assert!(converter.get_calls().is_empty());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn jxl_converter_failure_is_tool_failed() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo.jxl");
        std::fs::write(&source, b"jxl bytes").unwrap();

        let err = load_image(&source, &MockConverter::new(ConvertBehavior::Fail)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ToolFailed(ToolError::Failed { code: Some(1), .. })
        ));
    }

    #[test]
    fn jxl_partial_output_is_removed_after_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo.jxl");
        std::fs::write(&source, b"jxl bytes").unwrap();
        let converter = MockConverter::new(ConvertBehavior::PartialWriteThenFail);

        assert!(load_image(&source, &converter).is_err());
        assert!(!converted_path(&source).exists());
    }

    #[test]
    fn jxl_missing_source_is_not_found() {
        let converter = MockConverter::new(ConvertBehavior::Fail);
        let err = load_image(Path::new("/nonexistent/photo.jxl"), &converter).unwrap_err();
        assert!(matches!(err, DecodeError::NotFound(_)));
        assert!(converter.get_calls().is_empty());
    }
}
