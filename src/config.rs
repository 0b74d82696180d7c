//! Configuration module.
//!
//! Handles loading, validating, and merging `vipsize.toml`. Stock defaults are
//! overridden by the values in the file, which are in turn overridden by
//! command-line flags.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [engine]
//! max_alloc = 104857600     # Bytes a single decode may allocate (100 MiB)
//! max_dimension = 32768     # Largest accepted width or height
//!
//! [defaults]
//! width = 0                 # 0 = derive from the aspect ratio
//! height = 0
//! crop = false
//! enlarge = false
//! embed = false
//! extend = "black"          # black | white
//! interpolator = "bicubic"  # bicubic | bilinear | nohalo
//! gravity = "centre"        # centre | north | east | south | west | custom
//! left_pos = 0.0            # custom gravity, fraction of width
//! top_pos = 0.0             # custom gravity, fraction of height
//! quality = 100             # 1-100, 0 = default
//! savetype = "jpeg"         # jpeg | png | webp
//! no_auto_rotate = false
//! rotate = 0                # 0 | 90 | 180 | 270
//! flip = false
//! flop = false
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [defaults]
//! savetype = "webp"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::engine::EngineSettings;
use crate::imaging::Options;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "vipsize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `vipsize.toml`.
///
/// All fields have sensible defaults. Config files need only specify the
/// values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VipsizeConfig {
    /// Decoder bounds shared by every request.
    pub engine: EngineSettings,
    /// Request options used when a flag is not given on the command line.
    pub defaults: Options,
}

impl VipsizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.max_alloc == 0 {
            return Err(ConfigError::Validation(
                "engine.max_alloc must be non-zero".into(),
            ));
        }
        if self.engine.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "engine.max_dimension must be non-zero".into(),
            ));
        }
        for (key, value) in [
            ("left_pos", self.defaults.left_pos),
            ("top_pos", self.defaults.top_pos),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "defaults.{key} must be between 0.0 and 1.0"
                )));
            }
        }
        if self.defaults.crop && self.defaults.embed {
            return Err(ConfigError::Validation(
                "defaults.crop and defaults.embed are mutually exclusive".into(),
            ));
        }
        Ok(())
    }
}

/// Quality is clamped on deserialize, so out-of-range values are caught on the
/// raw table.
fn validate_raw(value: &toml::Value) -> Result<(), ConfigError> {
    let quality = value
        .get("defaults")
        .and_then(|d| d.get("quality"))
        .and_then(toml::Value::as_integer);
    match quality {
        Some(q) if !(0..=100).contains(&q) => Err(ConfigError::Validation(
            "defaults.quality must be 0-100".into(),
        )),
        _ => Ok(()),
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(VipsizeConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
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
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<VipsizeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    validate_raw(&merged)?;
    let config: VipsizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration.
///
/// With `None`, [`DEFAULT_CONFIG_FILE`] is used if it exists and stock
/// defaults otherwise. An explicit path must exist.
pub fn load_config(path: Option<&Path>) -> Result<VipsizeConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let raw = load_raw_config(path)?;
            if raw.is_none() {
                return Err(ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file {} not found", path.display()),
                )));
            }
            raw
        }
        None => load_raw_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    debug!(
        "config: {}",
        if overlay.is_some() { "file overlay" } else { "stock defaults" }
    );
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `vipsize.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# vipsize Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# The file is read from ./vipsize.toml unless --config points elsewhere.
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Engine limits
# ---------------------------------------------------------------------------
[engine]
# Maximum bytes a single decoded, resampled or padded image may take (100 MiB).
max_alloc = 104857600

# Largest accepted width or height, in pixels, on input and output.
max_dimension = 32768

# ---------------------------------------------------------------------------
# Default request options
# ---------------------------------------------------------------------------
[defaults]
# Target box. 0 leaves a side unconstrained (derived from the aspect ratio);
# both 0 keeps the original size.
width = 0
height = 0

# Fill the box and cut the overflow instead of fitting inside it.
crop = false

# Allow the output to be larger than the input.
enlarge = false

# Pad a fitted image out to the full box.
embed = false

# Border colour for embed: "black" or "white".
extend = "black"

# Resampling kernel: "bicubic", "bilinear" or "nohalo".
interpolator = "bicubic"

# Crop anchor: "centre", "north", "east", "south", "west" or "custom".
gravity = "centre"

# Custom gravity position as fractions of width and height (0.0-1.0).
left_pos = 0.0
top_pos = 0.0

# Encoder quality (1-100). 0 means the default of 100. JPEG only.
quality = 100

# Output format: "jpeg", "png" or "webp" (lossless).
savetype = "jpeg"

# Ignore the EXIF orientation tag.
no_auto_rotate = false

# Clockwise rotation: 0, 90, 180 or 270.
rotate = 0

# Mirror left-right (flip) or top-bottom (flop). Flip wins if both are set.
flip = false
flop = false
"##
}
