//! Error types for configuration and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{}': {source}", .path.display())]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A setting is outside its valid range
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue {
        /// Name of the offending setting.
        key: &'static str,
        /// Description of why the value is invalid.
        reason: String,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key,
            reason: reason.into(),
        }
    }
}

/// Errors that abort a tap extraction.
///
/// The display strings are the messages the command line prints.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Stimulus and recording were captured at different sample rates.
    #[error(
        "{} and {} do not have the same sample rate ({stimulus_rate} != {recording_rate})",
        .stimulus.display(),
        .recording.display()
    )]
    UnequalSampleRate {
        /// Stimulus file.
        stimulus: PathBuf,
        /// Recording file.
        recording: PathBuf,
        /// Stimulus sample rate in Hz.
        stimulus_rate: u32,
        /// Recording sample rate in Hz.
        recording_rate: u32,
    },

    /// The recording has fewer frames than the stimulus, so no alignment lag
    /// keeps the stimulus fully inside the recording.
    #[error(
        "Stimuli file ({}) is shorter than recording file ({}).",
        .stimulus.display(),
        .recording.display()
    )]
    StimuliShorterThanRecording {
        /// Stimulus file.
        stimulus: PathBuf,
        /// Recording file.
        recording: PathBuf,
    },

    /// The stimulus file holds no samples.
    #[error("Stimuli file ({}) has no samples.", .stimulus.display())]
    EmptyStimulus {
        /// Stimulus file.
        stimulus: PathBuf,
    },

    /// An input file could not be decoded.
    #[error("failed to decode '{}': {source}", .path.display())]
    Decode {
        /// File that failed to decode.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: rec2taps_io::Error,
    },

    /// Alignment failed for a reason other than input length.
    #[error("channel alignment failed: {0}")]
    Alignment(#[source] rec2taps_analysis::CorrelationError),

    /// Extraction settings are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ExtractError {
    /// Create a decode error.
    pub fn decode(path: impl Into<PathBuf>, source: rec2taps_io::Error) -> Self {
        ExtractError::Decode {
            path: path.into(),
            source,
        }
    }
}
