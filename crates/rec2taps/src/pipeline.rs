//! Tap extraction: decode, align, detect, convert.
//!
//! ```text
//! stimulus.wav ─┐
//!               ├─ ChannelAligner ─ (rec channel, lag) ─┐
//! recording.wav ┘                                       │
//!        sensor = 1 - rec channel ─ [invert] ─ PeakDetector ─ idx/sr·1000 - lag_ms
//! ```

use std::borrow::Cow;
use std::path::Path;

use rec2taps_analysis::{ChannelAligner, ChannelAlignment, CorrelationError, PeakDetector};
use rec2taps_io::{AudioDecoder, DecodedAudio, WavDecoder};

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::plot::WaveformRenderer;

/// Everything an extraction found, not just the tap times.
#[derive(Debug, Clone, PartialEq)]
pub struct TapReport {
    /// Winning channel pair and lag.
    pub alignment: ChannelAlignment,
    /// Shared sample rate of both files, in Hz.
    pub sample_rate: u32,
    /// Recording channel the taps were detected on.
    pub sensor_channel: usize,
    /// Alignment lag in milliseconds.
    pub lag_ms: f64,
    /// Peak positions in the recording, in samples.
    pub peak_indices: Vec<usize>,
    /// Peak times relative to stimulus onset, in milliseconds.
    pub peak_times_ms: Vec<f64>,
}

/// Extracts tap times from a stimulus/recording pair.
///
/// The decoder and renderer are collaborators supplied by the caller; by
/// default files are read as WAV and no plot is drawn.
pub struct TapExtractor<D = WavDecoder> {
    decoder: D,
    aligner: ChannelAligner,
    renderer: Option<Box<dyn WaveformRenderer>>,
}

impl TapExtractor<WavDecoder> {
    /// Extractor reading WAV files.
    pub fn new() -> Self {
        Self::with_decoder(WavDecoder)
    }
}

impl Default for TapExtractor<WavDecoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: AudioDecoder> TapExtractor<D> {
    /// Extractor using a custom decoder.
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            decoder,
            aligner: ChannelAligner::new(),
            renderer: None,
        }
    }

    /// Use `renderer` for debug plots.
    pub fn with_renderer(mut self, renderer: impl WaveformRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Replace the channel aligner (e.g. to force a correlation method).
    pub fn with_aligner(mut self, aligner: ChannelAligner) -> Self {
        self.aligner = aligner;
        self
    }

    /// Tap times in milliseconds relative to stimulus onset, ascending.
    pub fn extract(
        &self,
        stimulus: &Path,
        recording: &Path,
        config: &ExtractConfig,
    ) -> Result<Vec<f64>, ExtractError> {
        Ok(self.extract_report(stimulus, recording, config)?.peak_times_ms)
    }

    /// Like [`extract`](Self::extract), returning the intermediate alignment too.
    pub fn extract_report(
        &self,
        stimulus: &Path,
        recording: &Path,
        config: &ExtractConfig,
    ) -> Result<TapReport, ExtractError> {
        config.validate()?;

        let stim = self.decode(stimulus)?;
        let rec = self.decode(recording)?;

        if stim.sample_rate != rec.sample_rate {
            return Err(ExtractError::UnequalSampleRate {
                stimulus: stimulus.to_path_buf(),
                recording: recording.to_path_buf(),
                stimulus_rate: stim.sample_rate,
                recording_rate: rec.sample_rate,
            });
        }
        let sample_rate = rec.sample_rate;

        let alignment = self
            .aligner
            .align(&stim.signal.channels(), &rec.signal.channels())
            .map_err(|e| match e {
                CorrelationError::TooShort { .. } => ExtractError::StimuliShorterThanRecording {
                    stimulus: stimulus.to_path_buf(),
                    recording: recording.to_path_buf(),
                },
                CorrelationError::Empty => ExtractError::EmptyStimulus {
                    stimulus: stimulus.to_path_buf(),
                },
                other @ CorrelationError::Transform => ExtractError::Alignment(other),
            })?;

        let lag_ms = alignment.lag_ms(sample_rate);
        tracing::info!(
            "stimulus channel {} is looped back on recording channel {} with lag {} samples ({:.3} ms)",
            alignment.stimulus_channel,
            alignment.recording_channel,
            alignment.lag_samples,
            lag_ms
        );

        let sensor_channel = alignment.sensor_channel();
        let sensor: Cow<'_, [f32]> = if config.invert_sensor {
            Cow::Owned(rec.signal.channel(sensor_channel).iter().map(|&x| -x).collect())
        } else {
            Cow::Borrowed(rec.signal.channel(sensor_channel))
        };

        let detector = PeakDetector::new(config.min_distance_ms, config.prominence);
        let peak_indices = detector.detect(&sensor, sample_rate);
        tracing::info!(
            "detected {} taps on recording channel {}",
            peak_indices.len(),
            sensor_channel
        );

        let ms_per_sample = 1000.0 / f64::from(sample_rate);
        let peak_times_ms: Vec<f64> = peak_indices
            .iter()
            .map(|&i| i as f64 * ms_per_sample - lag_ms)
            .collect();

        if let Some(output) = &config.debug_plot {
            self.plot(&sensor, ms_per_sample, lag_ms, &peak_times_ms, output);
        }

        Ok(TapReport {
            alignment,
            sample_rate,
            sensor_channel,
            lag_ms,
            peak_indices,
            peak_times_ms,
        })
    }

    fn decode(&self, path: &Path) -> Result<DecodedAudio, ExtractError> {
        self.decoder
            .decode(path)
            .map_err(|e| ExtractError::decode(path, e))
    }

    /// Best effort: failures are logged and never abort the extraction.
    fn plot(
        &self,
        sensor: &[f32],
        ms_per_sample: f64,
        lag_ms: f64,
        peak_times_ms: &[f64],
        output: &Path,
    ) {
        let Some(renderer) = &self.renderer else {
            tracing::warn!(
                "debug plot requested at {} but no renderer is configured",
                output.display()
            );
            return;
        };

        let times_ms: Vec<f64> = (0..sensor.len())
            .map(|i| i as f64 * ms_per_sample - lag_ms)
            .collect();

        match renderer.render(&times_ms, sensor, peak_times_ms, output) {
            Ok(()) => tracing::debug!("wrote debug plot to {}", output.display()),
            Err(e) => tracing::warn!("failed to write debug plot {}: {e}", output.display()),
        }
    }
}

/// Extract tap times from two WAV files without a plot renderer.
///
/// # Example
///
/// ```rust,ignore
/// use rec2taps::{ExtractConfig, extract_peaks};
///
/// let taps = extract_peaks("stimulus.wav".as_ref(), "recording.wav".as_ref(), &ExtractConfig::default())?;
/// for t in taps {
///     println!("{t}");
/// }
/// ```
pub fn extract_peaks(
    stimulus: &Path,
    recording: &Path,
    config: &ExtractConfig,
) -> Result<Vec<f64>, ExtractError> {
    TapExtractor::new().extract(stimulus, recording, config)
}
