//! rec2taps Analysis - signal processing for tap extraction
//!
//! This crate holds the numeric core of rec2taps:
//!
//! - [`xcorr`] - Valid-mode cross-correlation (direct and FFT)
//! - [`align`] - Loopback channel pairing and lag estimation
//! - [`peaks`] - Adaptive-threshold peak detection for FSR signals
//! - [`dynamics`] - Amplitude statistics
//! - [`fft`] - Real-input FFT wrapper
//!
//! ## Example Workflow
//!
//! ```rust,ignore
//! use rec2taps_analysis::{ChannelAligner, PeakDetector};
//!
//! // 1. Find the loopback pair and the lag
//! let alignment = ChannelAligner::new().align(&stimulus.channels(), &recording.channels())?;
//!
//! // 2. Detect taps on the other recording channel
//! let sensor = recording.channel(alignment.sensor_channel());
//! let peaks = PeakDetector::new(100.0, 2.0).detect(sensor, sample_rate);
//!
//! // 3. Re-base onto the stimulus timeline
//! let lag_ms = alignment.lag_ms(sample_rate);
//! let times: Vec<f64> = peaks.iter().map(|&p| p as f64 * 1000.0 / sample_rate as f64 - lag_ms).collect();
//! ```

pub mod align;
pub mod dynamics;
pub mod fft;
pub mod peaks;
pub mod xcorr;

// Re-export main types
pub use align::{ChannelAligner, ChannelAlignment};
pub use dynamics::{mean, std_dev};
pub use fft::Fft;
pub use peaks::{PeakDetector, find_peaks, local_maxima, prominences};
pub use xcorr::{CorrelationError, CorrelationMethod, argmax, xcorr_valid, xcorr_valid_spectra};
