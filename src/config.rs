//! Run configuration.
//!
//! Handles loading, validating, and merging `config.toml`. The file is sparse:
//! stock defaults are the base layer and user values are merged on top, so a
//! config only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [source]
//! repo = "backgrounds-git"                  # Checkout of the asset repository
//! tag_prefixes = ["GNOME_BACKRGROUNDS_", "GNOME_BACKGROUNDS_"]
//! extensions = ["jpg", "png", "webp", "jxl", "svg"]
//! skip = ["badscaling", "defaults"]         # Path substrings to ignore
//!
//! [classify.aliases]                        # Extra renames, file stem → identifier
//!
//! [thumbnails]
//! dir = "backgrounds"       # Subdirectory of the output root
//! height = 400              # Fixed thumbnail height in pixels
//! format = "png"
//! backend = "magick"        # "magick" or "rust"
//! magick_program = "magick" # ImageMagick binary ("convert" for IM6)
//! force = false             # Regenerate thumbnails that already exist
//!
//! [report]
//! title = "Gnome Backgrounds over Time"
//! heading = "All Gnome Backgrounds found on GitLab"
//! repository_url = "https://gitlab.gnome.org/GNOME/gnome-backgrounds/"
//! source_url = "https://gitlab.gnome.org/GNOME/gnome-backgrounds/-/blob/{tag}/{path}?ref_type=tags"
//! column_width = 120
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full configuration of a run.
///
/// All fields have defaults matching the gnome-backgrounds repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the asset repository lives and which files count as assets.
    pub source: SourceConfig,
    /// Extra file-stem aliases for the classifier.
    pub classify: ClassifyConfig,
    /// Thumbnail generation settings.
    pub thumbnails: ThumbnailsConfig,
    /// HTML report settings.
    pub report: ReportConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "source.extensions must not be empty".into(),
            ));
        }
        if self.thumbnails.height == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.height must be non-zero".into(),
            ));
        }
        if self.thumbnails.format.trim().is_empty() {
            return Err(ConfigError::Validation(
                "thumbnails.format must not be empty".into(),
            ));
        }
        if self.thumbnails.magick_program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "thumbnails.magick_program must not be empty".into(),
            ));
        }
        if self.report.column_width == 0 {
            return Err(ConfigError::Validation(
                "report.column_width must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Source repository settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Path to the git checkout that gets walked (and repeatedly checked out).
    pub repo: String,
    /// Literal prefixes stripped from tags before version parsing.
    pub tag_prefixes: Vec<String>,
    /// Extensions (without dot, case-insensitive) that count as assets.
    pub extensions: Vec<String>,
    /// Paths containing any of these substrings are ignored.
    pub skip: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repo: "backgrounds-git".to_string(),
            // The first one is a misspelling that exists in the tag history.
            tag_prefixes: vec![
                "GNOME_BACKRGROUNDS_".to_string(),
                "GNOME_BACKGROUNDS_".to_string(),
            ],
            extensions: ["jpg", "png", "webp", "jxl", "svg"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            skip: vec!["badscaling".to_string(), "defaults".to_string()],
        }
    }
}

/// Classifier settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifyConfig {
    /// File stem → logical identifier. Overrides the stock alias table.
    pub aliases: BTreeMap<String, String>,
}

/// Which image backend renders thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// ImageMagick's `magick` binary. Handles SVG and JPEG XL.
    #[default]
    Magick,
    /// Built-in `image` crate backend. JPEG, PNG and WebP only.
    Rust,
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Directory under the output root holding `<version>/<file>.<format>`.
    pub dir: String,
    /// Fixed height in pixels; width follows the aspect ratio.
    pub height: u32,
    /// Output format extension appended to the original file name.
    pub format: String,
    pub backend: BackendKind,
    /// Binary run by the ImageMagick backend, e.g. `convert` for ImageMagick 6.
    pub magick_program: String,
    /// Regenerate thumbnails even when the target file exists.
    pub force: bool,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            dir: "backgrounds".to_string(),
            height: 400,
            format: "png".to_string(),
            backend: BackendKind::default(),
            magick_program: "magick".to_string(),
            force: false,
        }
    }
}

/// HTML report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Document `<title>`.
    pub title: String,
    /// Page `<h1>`.
    pub heading: String,
    /// Link to the repository shown in the intro paragraph.
    pub repository_url: String,
    /// Link template for each tile. `{tag}`, `{path}` and `{file}` are substituted.
    pub source_url: String,
    /// Width of one release column in CSS pixels.
    pub column_width: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Gnome Backgrounds over Time".to_string(),
            heading: "All Gnome Backgrounds found on GitLab".to_string(),
            repository_url: "https://gitlab.gnome.org/GNOME/gnome-backgrounds/".to_string(),
            source_url:
                "https://gitlab.gnome.org/GNOME/gnome-backgrounds/-/blob/{tag}/{path}?ref_type=tags"
                    .to_string(),
            column_width: 120,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
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
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, falling back to stock defaults when absent.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# bg-timeline configuration
# All settings are optional. Values shown below are the defaults.
# Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Source repository
# ---------------------------------------------------------------------------
[source]
# Git checkout that is walked tag by tag. It gets checked out in place.
repo = "backgrounds-git"

# Literal prefixes stripped from tag names before parsing the version.
tag_prefixes = ["GNOME_BACKRGROUNDS_", "GNOME_BACKGROUNDS_"]

# File extensions that count as background images (case-insensitive).
extensions = ["jpg", "png", "webp", "jxl", "svg"]

# Any path containing one of these substrings is ignored.
skip = ["badscaling", "defaults"]

# ---------------------------------------------------------------------------
# Classification
# ---------------------------------------------------------------------------
[classify.aliases]
# Map a file stem to the identifier it should share a row with.
# These entries extend (and override) the built-in rename table.
# "old-name" = "new-name-l"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Directory under the output root: <dir>/<version>/<file>.<format>
dir = "backgrounds"

# Thumbnail height in pixels. Width keeps the source aspect ratio.
height = 400

# Output format, appended to the original file name.
format = "png"

# "magick" shells out to ImageMagick (handles svg and jxl).
# "rust" uses the built-in decoder (jpg, png, webp only).
backend = "magick"

# Binary used by the "magick" backend. ImageMagick 6 installs it as "convert".
magick_program = "magick"

# Regenerate thumbnails that already exist.
force = false

# ---------------------------------------------------------------------------
# Report
# ---------------------------------------------------------------------------
[report]
title = "Gnome Backgrounds over Time"
heading = "All Gnome Backgrounds found on GitLab"
repository_url = "https://gitlab.gnome.org/GNOME/gnome-backgrounds/"

# Link target of each tile. {tag}, {path} and {file} are substituted.
source_url = "https://gitlab.gnome.org/GNOME/gnome-backgrounds/-/blob/{tag}/{path}?ref_type=tags"

# Width of one release column in CSS pixels.
column_width = 120
"##
}
