//! Configuration module.
//!
//! Responsibilities:
//! - Optional user defaults in a single YAML file (`config.yaml`)
//! - File lives inside the platform standard configuration directory (`dirs::config_dir()`) under an app subdirectory (`dcolgen`)
//! - Every field is optional; missing file => built-in defaults
//! - Corrupt / invalid YAML => fatal error (`LoadError::Corrupt`)
//! - Out of range values => fatal error (`LoadError::Invalid`)
//!
//! Command line flags override anything loaded here.
//!
//! YAML backend: `serde_norway` (API-compatible with `serde_yaml`).
//!
//! Example:
//! ```yaml
//! extractor: matugen
//! alpha: 0.95
//! palette: vibrant
//! mode: auto
//! selection: priority
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::color::ModeRequest;
use crate::scheme::{PaletteStyle, Selection};

const DEFAULT_EXTRACTOR: &str = "matugen";
const DEFAULT_ALPHA: f64 = 1.0;

/// Resolved configuration (file values with defaults filled in).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub extractor: String,
    pub alpha: f64,
    pub palette: PaletteStyle,
    pub mode: ModeRequest,
    pub selection: Selection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    extractor: Option<String>,
    alpha: Option<f64>,
    palette: Option<PaletteStyle>,
    mode: Option<ModeRequest>,
    selection: Option<Selection>,
}

#[derive(Debug)]
pub enum LoadError {
    /// YAML exists but is syntactically invalid.
    Corrupt(String),
    /// YAML parsed but holds an unusable value.
    Invalid(String),

    Io(io::Error),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extractor: DEFAULT_EXTRACTOR.to_string(),
            alpha: DEFAULT_ALPHA,
            palette: PaletteStyle::default(),
            mode: ModeRequest::default(),
            selection: Selection::default(),
        }
    }
}

impl Config {
    /// Load from the standard location.
    pub fn load() -> Result<Self, LoadError> {
        Self::load_from(&Self::file_path())
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            log::debug!("No config at {}; using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(raw: &str) -> Result<Self, LoadError> {
        // An empty document deserializes to unit, not a mapping.
        let file = if raw.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_norway::from_str::<ConfigFile>(raw)
                .map_err(|e| LoadError::Corrupt(e.to_string()))?
        };

        let defaults = Self::default();
        let config = Self {
            extractor: file.extractor.unwrap_or(defaults.extractor),
            alpha: file.alpha.unwrap_or(defaults.alpha),
            palette: file.palette.unwrap_or(defaults.palette),
            mode: file.mode.unwrap_or(defaults.mode),
            selection: file.selection.unwrap_or(defaults.selection),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot use.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.extractor.trim().is_empty() {
            return Err(LoadError::Invalid("extractor cannot be blank".into()));
        }
        validate_alpha(self.alpha).map_err(LoadError::Invalid)
    }

    /// Path to the on-disk configuration file.
    pub fn file_path() -> PathBuf {
        config_file_path()
    }
}

/// Alpha must be a finite value in `[0, 1]`.
pub fn validate_alpha(alpha: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(())
    } else {
        Err(format!("alpha must be between 0 and 1 (got {alpha})"))
    }
}

/// Build canonical path to config.yaml
fn config_file_path() -> PathBuf {
    app_config_dir().join("config.yaml")
}

/// Determine application config directory: `<platform_config_dir>/dcolgen`
pub fn app_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| fallback_home_join(".config"))
        .join("dcolgen")
}

/// Fallback: if `config_dir` unavailable, attempt to use HOME; else current directory.
fn fallback_home_join(child: &str) -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(".").join(child), |h| h.join(child))
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corrupt(s) => write!(f, "Corrupt config YAML: {s}"),
            Self::Invalid(s) => write!(f, "Invalid config value: {s}"),
            Self::Io(e) => write!(f, "I/O error loading config: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}
