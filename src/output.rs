//! CLI output formatting for comparison results.
//!
//! # Output Format
//!
//! ## Image summary
//!
//! One block per loaded image. The path is wrapped at `/` boundaries so long
//! paths stay readable in a narrow terminal, followed by a blank line and the
//! dimensions and size:
//!
//! ```text
//! /home/user/photos/2024
//! /holiday/IMG_0001.jpg
//!
//! 800x600 | 1 234 567 bytes
//! ```
//!
//! ## Diff
//!
//! ```text
//! Images differ with MAE: 12.34 (480 000 px)
//! ```
//!
//! or `Images are identical`.
//!
//! # Architecture
//!
//! Each entity has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. `--json` output goes through
//! [`ComparisonReport`] instead.

use crate::format::{format_int_with_spaces, wrap_path};
use crate::imaging::DiffSummary;
use crate::session::LoadedImage;
use serde::Serialize;
use std::path::Path;

/// Paths are wrapped to this many characters per line.
pub const PATH_WRAP_WIDTH: usize = 40;

fn format_bytes(size: u64) -> String {
    format_int_with_spaces(i64::try_from(size).unwrap_or(i64::MAX))
}

/// Format the summary block for one loaded image.
pub fn format_image_summary(path: &Path, width: u32, height: u32, file_size: u64) -> Vec<String> {
    let mut lines: Vec<String> = wrap_path(&path.display().to_string(), PATH_WRAP_WIDTH)
        .lines()
        .map(str::to_string)
        .collect();
    lines.push(String::new());
    lines.push(format!(
        "{}x{} | {} bytes",
        width,
        height,
        format_bytes(file_size)
    ));
    lines
}

/// Format the one-line verdict for a diff.
pub fn format_diff_message(summary: &DiffSummary) -> String {
    if summary.identical {
        "Images are identical".to_string()
    } else {
        format!(
            "Images differ with MAE: {:.2} ({} px)",
            summary.mean_absolute_error,
            format_int_with_spaces(i64::try_from(summary.pixel_count).unwrap_or(i64::MAX))
        )
    }
}

/// Print the summary block for one loaded image.
pub fn print_image_summary(image: &LoadedImage) {
    let (width, height) = image.dimensions();
    for line in format_image_summary(&image.path, width, height, image.file_size) {
        println!("{}", line);
    }
}

pub fn print_diff_message(summary: &DiffSummary) {
    println!("{}", format_diff_message(summary));
}

/// One image as it appears in a JSON report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageReport {
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
}

impl From<&LoadedImage> for ImageReport {
    fn from(image: &LoadedImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            path: image.path.display().to_string(),
            width,
            height,
            file_size: image.file_size,
        }
    }
}

/// Machine-readable result of `compare --json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub first: ImageReport,
    pub second: ImageReport,
    pub diff: DiffSummary,
    /// Whether the pair is already in the ignore log.
    pub ignored: bool,
}

impl ComparisonReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(mae: f64, pixels: u64) -> DiffSummary {
        DiffSummary {
            mean_absolute_error: mae,
            pixel_count: pixels,
            identical: mae == 0.0,
        }
    }

    #[test]
    fn image_summary_short_path() {
        let lines = format_image_summary(Path::new("/tmp/a.png"), 800, 600, 1234567);
        assert_eq!(lines, vec!["/tmp/a.png", "", "800x600 | 1 234 567 bytes"]);
    }

    #[test]
    fn image_summary_wraps_long_path() {
        let path = Path::new("/home/someone/pictures/holidays/2024/summer/IMG_0001.jpg");
        let lines = format_image_summary(path, 10, 10, 99);

        let blank = lines.iter().position(String::is_empty).unwrap();
        assert!(blank > 1, "expected wrapped path, got {lines:?}");
        for line in &lines[1..blank] {
            assert!(line.starts_with('/'));
        }
        assert_eq!(lines[..blank].concat(), path.display().to_string());
        assert_eq!(lines.last().unwrap(), "10x10 | 99 bytes");
    }

    #[test]
    fn diff_message_identical() {
        assert_eq!(format_diff_message(&summary(0.0, 100)), "Images are identical");
    }

    #[test]
    fn diff_message_two_decimals_and_grouped_pixels() {
        assert_eq!(
            format_diff_message(&summary(12.3456, 480_000)),
            "Images differ with MAE: 12.35 (480 000 px)"
        );
    }

    #[test]
    fn report_serializes_to_json() {
        let report = ComparisonReport {
            first: ImageReport {
                path: "a.png".into(),
                width: 2,
                height: 1,
                file_size: 10,
            },
            second: ImageReport {
                path: "b.png".into(),
                width: 2,
                height: 1,
                file_size: 12,
            },
            diff: summary(1.5, 2),
            ignored: true,
        };

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["first"]["path"], "a.png");
        assert_eq!(value["second"]["file_size"], 12);
        assert_eq!(value["diff"]["mean_absolute_error"], 1.5);
        assert_eq!(value["diff"]["pixel_count"], 2);
        assert_eq!(value["diff"]["identical"], false);
        assert_eq!(value["ignored"], true);
    }
}
