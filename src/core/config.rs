//! User configuration file (`<config dir>/critica/config.json`).

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

use crate::core::DiffMode;

static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Per-user critica config directory, if the platform has one.
pub fn config_dir() -> Option<&'static Path> {
    CONFIG_DIR
        .get_or_init(|| {
            directories::ProjectDirs::from("", "", "critica")
                .map(|d| d.config_dir().to_path_buf())
        })
        .as_deref()
}

/// Location of `config.json`.
pub fn default_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.json"))
}

/// Errors loading the config file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File exists but could not be read.
    #[error("read config {}: {source}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// File is not valid JSON for the config schema.
    #[error("parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value outside its allowed set.
    #[error("invalid {field} {value:?}: {reason}")]
    InvalidValue {
        /// JSON field name.
        field: &'static str,
        /// Value as written in the file.
        value: String,
        /// What was expected.
        reason: &'static str,
    },
}

/// How strongly changed lines are tinted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffStyle {
    /// Subtle line backgrounds.
    #[default]
    Default,
    /// No line backgrounds, colored text only.
    Patch,
    /// Strong line backgrounds.
    Filled,
}

impl DiffStyle {
    /// Parse a style name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::Default),
            "patch" => Some(Self::Patch),
            "filled" => Some(Self::Filled),
            _ => None,
        }
    }
}

/// File schema. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    interactive: Option<bool>,
    unified: Option<bool>,
    no_color: Option<bool>,
    diff_mode: Option<String>,
    diff_style: Option<String>,
    added_text_color: Option<String>,
    deleted_text_color: Option<String>,
    theme: Option<String>,
}

/// Normalized configuration. `None` means "not set, use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Start the interactive viewer.
    pub interactive: Option<bool>,
    /// Use the unified layout instead of split.
    pub unified: Option<bool>,
    /// Disable ANSI colors in static output.
    pub no_color: Option<bool>,
    /// Which changes to show.
    pub diff_mode: Option<DiffMode>,
    /// Line tint style.
    pub diff_style: Option<DiffStyle>,
    /// Added-line text color as `#rrggbb`.
    pub added_text_color: Option<String>,
    /// Deleted-line text color as `#rrggbb`.
    pub deleted_text_color: Option<String>,
    /// Theme name.
    pub theme: Option<String>,
}

impl Config {
    /// Load from [`default_path`]. A missing file yields the default config.
    pub fn load() -> Result<Self, ConfigError> {
        match default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from an explicit path. A missing file yields the default config.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_json(&content)
    }

    /// Parse and normalize config JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Self::normalize(raw)
    }

    fn normalize(raw: RawConfig) -> Result<Self, ConfigError> {
        let diff_mode = match non_empty(raw.diff_mode.as_deref()) {
            None => None,
            Some(value) => Some(DiffMode::from_name(value).ok_or_else(|| {
                ConfigError::InvalidValue {
                    field: "diff_mode",
                    value: value.to_string(),
                    reason: "expected all, staged or unstaged",
                }
            })?),
        };

        let diff_style = match non_empty(raw.diff_style.as_deref()) {
            None => None,
            Some(value) => Some(DiffStyle::from_name(value).ok_or_else(|| {
                ConfigError::InvalidValue {
                    field: "diff_style",
                    value: value.to_string(),
                    reason: "expected default, patch or filled",
                }
            })?),
        };

        Ok(Self {
            interactive: raw.interactive,
            unified: raw.unified,
            no_color: raw.no_color,
            diff_mode,
            diff_style,
            added_text_color: normalize_hex_color("added_text_color", raw.added_text_color)?,
            deleted_text_color: normalize_hex_color("deleted_text_color", raw.deleted_text_color)?,
            theme: non_empty(raw.theme.as_deref()).map(str::to_string),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Accept `rrggbb` or `#rrggbb`; return lowercase `#rrggbb`.
fn normalize_hex_color(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, ConfigError> {
    let Some(trimmed) = non_empty(value.as_deref()) else {
        return Ok(None);
    };
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    let invalid = |reason| ConfigError::InvalidValue {
        field,
        value: trimmed.to_string(),
        reason,
    };
    if digits.len() != 6 {
        return Err(invalid("must be a 6-digit hex color"));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("must contain only hexadecimal digits"));
    }

    Ok(Some(format!("#{}", digits.to_ascii_lowercase())))
}
