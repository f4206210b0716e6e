//! Extraction settings and where they are loaded from.
//!
//! Settings come from built-in defaults, optionally overridden by a TOML file.
//! The user file lives at:
//!
//! - Linux: `~/.config/rec2taps/config.toml`
//! - macOS: `~/Library/Application Support/rec2taps/config.toml`
//! - Windows: `%APPDATA%\rec2taps\config.toml`
//!
//! # TOML Format
//!
//! ```toml
//! min_distance_ms = 100.0
//! prominence = 2.0
//! invert_sensor = false
//! debug_plot = "taps.pgm"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "rec2taps";

/// File name of the user configuration.
const CONFIG_FILE: &str = "config.toml";

/// Default minimum spacing between taps, in milliseconds.
pub const DEFAULT_DISTANCE_MS: f64 = 100.0;

/// Default prominence multiplier (times the sensor standard deviation).
pub const DEFAULT_PROMINENCE: f64 = 2.0;

/// Settings for one tap extraction.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Minimum spacing between detected taps, in milliseconds.
    pub min_distance_ms: f64,

    /// Prominence threshold as a multiple of the sensor standard deviation.
    pub prominence: f64,

    /// Negate the sensor channel before detection (reverse-wired sensors).
    pub invert_sensor: bool,

    /// Where to write a diagnostic waveform image, if anywhere.
    pub debug_plot: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_distance_ms: DEFAULT_DISTANCE_MS,
            prominence: DEFAULT_PROMINENCE,
            invert_sensor: false,
            debug_plot: None,
        }
    }
}

impl ExtractConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the user configuration file if it exists, else the defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.is_file() {
            tracing::debug!("loading user config from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check that distance and prominence are finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_distance_ms.is_finite() && self.min_distance_ms > 0.0) {
            return Err(ConfigError::invalid_value(
                "min_distance_ms",
                format!("must be a positive number, got {}", self.min_distance_ms),
            ));
        }
        if !(self.prominence.is_finite() && self.prominence > 0.0) {
            return Err(ConfigError::invalid_value(
                "prominence",
                format!("must be a positive number, got {}", self.prominence),
            ));
        }
        Ok(())
    }

    /// Set the minimum tap spacing.
    pub fn with_min_distance_ms(mut self, min_distance_ms: f64) -> Self {
        self.min_distance_ms = min_distance_ms;
        self
    }

    /// Set the prominence multiplier.
    pub fn with_prominence(mut self, prominence: f64) -> Self {
        self.prominence = prominence;
        self
    }

    /// Enable or disable sensor inversion.
    pub fn with_invert_sensor(mut self, invert: bool) -> Self {
        self.invert_sensor = invert;
        self
    }

    /// Request a debug plot at `path`.
    pub fn with_debug_plot(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_plot = Some(path.into());
        self
    }
}

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the user configuration file (which may not exist).
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = ExtractConfig::default();
        assert_eq!(config.min_distance_ms, 100.0);
        assert_eq!(config.prominence, 2.0);
        assert!(!config.invert_sensor);
        assert!(config.debug_plot.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ExtractConfig::from_toml_str("prominence = 3.5\n").unwrap();
        assert_eq!(config.prominence, 3.5);
        assert_eq!(config.min_distance_ms, DEFAULT_DISTANCE_MS);
    }

    #[test]
    fn full_toml() {
        let config = ExtractConfig::from_toml_str(
            r#"
            min_distance_ms = 50.0
            prominence = 1.5
            invert_sensor = true
            debug_plot = "out/taps.pgm"
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            ExtractConfig::default()
                .with_min_distance_ms(50.0)
                .with_prominence(1.5)
                .with_invert_sensor(true)
                .with_debug_plot("out/taps.pgm")
        );
    }

    #[test]
    fn unknown_key_rejected() {
        let err = ExtractConfig::from_toml_str("distance = 50.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn non_positive_values_rejected() {
        let err = ExtractConfig::default()
            .with_prominence(0.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "prominence", .. }));

        let err = ExtractConfig::from_toml_str("min_distance_ms = -5.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "min_distance_ms",
                ..
            }
        ));

        assert!(
            ExtractConfig::default()
                .with_min_distance_ms(f64::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "min_distance_ms = 75.0\ninvert_sensor = true\n").unwrap();

        let config = ExtractConfig::load(&path).unwrap();
        assert_eq!(config.min_distance_ms, 75.0);
        assert!(config.invert_sensor);
    }

    #[test]
    fn load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ExtractConfig::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn config_path_ends_with_app_dir() {
        let path = default_config_path();
        assert!(path.ends_with("rec2taps/config.toml"));
    }
}
