//! Tool configuration module.
//!
//! Handles loading and validating `darkroom.toml`. Configuration is sparse:
//! stock defaults are the base layer and a user config file overrides only
//! the keys it names. Unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! enabled = true                # false disables the pass entirely
//! max_width = 1200              # global width cap in pixels
//! images_root = "assets/images" # image tree, relative to source and dest roots
//! backend = "auto"              # auto | native | magick | none
//!
//! [per_dir]                     # per-subdirectory max_width overrides
//! musics = 800
//!
//! exclude_originals = []        # subdirs whose raw files must never be published
//! ```
//!
//! ## Semantics
//!
//! - `per_dir` keys are subdirectory *names* under the images root, not
//!   paths. A listed directory uses its override instead of `max_width`;
//!   everything else uses the global value.
//! - `exclude_originals` names directories whose source files are never
//!   written to the destination. Only derived files from their `resize/`
//!   cache are published. See [`process`](crate::process) for the cache
//!   protocol.
//! - `backend = "none"` forces copy-only mode. `native`/`magick` pin a
//!   single backend; `auto` tries native first, then the ImageMagick CLI.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
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

/// Which image backend(s) the selection pass may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Try the native backend, then the ImageMagick CLI.
    #[default]
    Auto,
    /// Only the pure-Rust backend.
    Native,
    /// Only the ImageMagick CLI backend.
    Magick,
    /// No backend: degrade to staleness-gated copying.
    None,
}

/// Tool configuration loaded from `darkroom.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Master switch. When false, `run` writes nothing and exits cleanly.
    pub enabled: bool,
    /// Global width cap in pixels. Images wider than this are resized.
    pub max_width: u32,
    /// Image tree location, relative to both the source and dest roots.
    pub images_root: String,
    /// Backend preference for the one-time selection pass.
    pub backend: BackendPreference,
    /// Per-subdirectory `max_width` overrides, keyed by directory name.
    pub per_dir: BTreeMap<String, u32>,
    /// Subdirectories whose originals must never reach the destination.
    pub exclude_originals: BTreeSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            max_width: 1200,
            images_root: "assets/images".to_string(),
            backend: BackendPreference::Auto,
            per_dir: BTreeMap::new(),
            exclude_originals: BTreeSet::new(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_width == 0 {
            return Err(ConfigError::Validation("max_width must be > 0".into()));
        }
        if let Some((dir, _)) = self.per_dir.iter().find(|&(_, &w)| w == 0) {
            return Err(ConfigError::Validation(format!(
                "per_dir.{dir} must be > 0"
            )));
        }
        if self.images_root.is_empty() {
            return Err(ConfigError::Validation(
                "images_root must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// The effective width cap for a subdirectory name.
    ///
    /// A `per_dir` override replaces the global `max_width` when present.
    pub fn max_width_for(&self, dir_name: &str) -> u32 {
        self.per_dir.get(dir_name).copied().unwrap_or(self.max_width)
    }

    /// Whether a subdirectory's originals are barred from the destination.
    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.exclude_originals.contains(dir_name)
    }
}

/// Load the config file at `path`, merged onto stock defaults and validated.
///
/// Returns stock defaults if the file does not exist. Returns `Err` if the
/// file exists but contains invalid TOML, unknown keys, or invalid values.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// The stock `darkroom.toml` with all options documented.
///
/// Printed by `darkroom gen-config`. Round-trips through [`load_config`].
pub fn stock_config_toml() -> String {
    r#"# darkroom configuration
# All options are optional - defaults shown below.

# Master switch. Set to false to skip the post-processing pass entirely.
enabled = true

# Global width cap in pixels. Images wider than this are resized down,
# preserving aspect ratio. Narrower images are copied as-is.
max_width = 1200

# Image tree location, relative to both --source and --dest.
images_root = "assets/images"

# Backend preference: "auto" (native, then ImageMagick CLI), "native",
# "magick", or "none" (copy-only mode).
backend = "auto"

# Per-subdirectory overrides of max_width, keyed by directory name.
# [per_dir]
# musics = 800

# Subdirectories whose original files must never appear in the output.
# Only derived files from their resize/ cache are published.
# exclude_originals = ["films"]
"#
    .to_string()
}
