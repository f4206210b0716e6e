//! Tap extraction for sensorimotor synchronization experiments.
//!
//! A stimulus file is played through an audio interface while a stereo
//! recording captures two things: the stimulus looped back from the output,
//! and a force-sensitive resistor the participant taps on. This crate lines
//! the loopback up against the stimulus and reports every tap as a time in
//! milliseconds relative to stimulus onset.
//!
//! # Features
//!
//! - **Extraction**: [`TapExtractor`] with an injectable decoder and renderer,
//!   or the [`extract_peaks`] shorthand for WAV files
//! - **Configuration**: [`ExtractConfig`], loadable from TOML
//! - **Debug plots**: [`PgmRenderer`] draws the sensor trace with tap markers
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use rec2taps::{ExtractConfig, PgmRenderer, TapExtractor};
//!
//! let config = ExtractConfig::default().with_debug_plot("taps.pgm");
//! let taps = TapExtractor::new()
//!     .with_renderer(PgmRenderer::default())
//!     .extract(Path::new("stimulus.wav"), Path::new("recording.wav"), &config)
//!     .unwrap();
//!
//! for t in taps {
//!     println!("{t}");
//! }
//! ```

mod error;
mod pipeline;

/// Extraction settings and their file locations.
pub mod config;

/// Waveform rendering for debug plots.
pub mod plot;

pub use config::{DEFAULT_DISTANCE_MS, DEFAULT_PROMINENCE, ExtractConfig, default_config_path};
pub use error::{ConfigError, ExtractError};
pub use pipeline::{TapExtractor, TapReport, extract_peaks};
pub use plot::{PgmRenderer, WaveformRenderer};

pub use rec2taps_analysis::{ChannelAligner, ChannelAlignment, CorrelationMethod};
pub use rec2taps_io::{AudioDecoder, DecodedAudio, StereoSignal, WavDecoder};
