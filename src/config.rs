//! Application configuration.
//!
//! Handles loading, validating, and merging `imgcomp.toml`. Stock defaults are
//! overridden by the config file, which is in turn overridden by command-line
//! flags.
//!
//! ## Config File Location
//!
//! `imgcomp.toml` in the working directory, or any file passed with
//! `--config`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! scaling_algorithm = "bilinear"  # bilinear | nearest
//! use_trash = false               # delete via the trash tool instead of unlinking
//! show_management_controls = true # allow the delete/ignore commands
//! ignore_log = "ignored_images.txt"
//! debounce_ms = 10                # slider quiet window
//!
//! [bounds]
//! max_width = 400                 # display/preview bounding box
//! max_height = 400
//!
//! [diff]
//! amplification = 5.0             # multiplier for the difference swatch
//! monochrome = false              # flat red for any difference
//!
//! [tools]
//! converter = "djxl"              # JPEG XL → PNG converter
//! trash = "trash"                 # trash command
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! scaling_algorithm = "nearest"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::ignore_log::DEFAULT_IGNORE_LOG;
use crate::imaging::{BoundingBox, ScalingAlgorithm, diff::AMPLIFICATION};
use crate::tools::{DEFAULT_CONVERTER, DEFAULT_TRASH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "imgcomp.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `imgcomp.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Interpolation for every resize in a session.
    pub scaling_algorithm: ScalingAlgorithm,
    /// Move deleted files to the trash instead of removing them.
    pub use_trash: bool,
    /// Whether the delete and ignore commands are enabled.
    pub show_management_controls: bool,
    /// Where ignored pairs are appended.
    pub ignore_log: String,
    /// Quiet window before a slider crop runs.
    pub debounce_ms: u64,
    /// Display bounding box.
    pub bounds: BoundingBox,
    /// Difference rendering.
    pub diff: DiffConfig,
    /// External programs.
    pub tools: ToolsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scaling_algorithm: ScalingAlgorithm::default(),
            use_trash: false,
            show_management_controls: true,
            ignore_log: DEFAULT_IGNORE_LOG.to_string(),
            debounce_ms: 10,
            bounds: BoundingBox::default(),
            diff: DiffConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bounds.max_width == 0 || self.bounds.max_height == 0 {
            return Err(ConfigError::Validation(
                "bounds.max_width and bounds.max_height must be non-zero".into(),
            ));
        }
        if !self.diff.amplification.is_finite() || self.diff.amplification <= 0.0 {
            return Err(ConfigError::Validation(
                "diff.amplification must be a positive number".into(),
            ));
        }
        if self.tools.converter.trim().is_empty() || self.tools.trash.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tools.converter and tools.trash must not be empty".into(),
            ));
        }
        if self.ignore_log.trim().is_empty() {
            return Err(ConfigError::Validation(
                "ignore_log must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Difference visualization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// Multiplier applied to per-channel deltas before clamping to 255.
    pub amplification: f64,
    /// Show every differing pixel in flat red.
    pub monochrome: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            amplification: AMPLIFICATION,
            monochrome: false,
        }
    }
}

/// External program names, resolved through `PATH`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub converter: String,
    pub trash: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            converter: DEFAULT_CONVERTER.to_string(),
            trash: DEFAULT_TRASH.to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `imgcomp.toml` from `dir`, falling back to defaults when absent.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        log::debug!("no {} in {}, using defaults", CONFIG_FILE, dir.display());
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Load an explicit config file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    log::debug!("loading config from {}", path.display());
    resolve_config(Some(load_raw_config(path)?))
}

/// Returns a fully-commented stock `imgcomp.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgcomp configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.

# Interpolation used for every resize: "bilinear" (smooth) or "nearest"
# (blocky, keeps hard edges for pixel art).
scaling_algorithm = "bilinear"

# Move deleted images to the trash with the `tools.trash` command instead of
# removing them. The command must be on PATH.
use_trash = false

# Enable the `delete` and `ignore` commands.
show_management_controls = true

# File that `ignore` appends "<first>:<second>" lines to.
ignore_log = "ignored_images.txt"

# Quiet period in milliseconds before a slider crop is rendered.
debounce_ms = 10

# ---------------------------------------------------------------------------
# Preview bounding box
# ---------------------------------------------------------------------------
[bounds]
max_width = 400
max_height = 400

# ---------------------------------------------------------------------------
# Difference view
# ---------------------------------------------------------------------------
[diff]
# Per-channel deltas are multiplied by this and clamped to 255.
amplification = 5.0
# Paint every differing pixel flat red instead of the amplified delta.
monochrome = false

# ---------------------------------------------------------------------------
# External tools
# ---------------------------------------------------------------------------
[tools]
# Invoked as `<converter> <input.jxl> <output.png>`.
converter = "djxl"
# Invoked as `<trash> <path>`.
trash = "trash"
"##
}
