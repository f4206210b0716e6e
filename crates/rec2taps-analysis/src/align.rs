//! Loopback channel alignment.
//!
//! Which physical channel carries the loopback depends on cabling, so every
//! (stimulus channel, recording channel) pair is scored by its valid-mode
//! cross-correlation and the best-scoring pair wins. For stereo files that is
//! four correlations; the search is written over channel counts, so wider
//! files only change the loop bounds.
//!
//! On the FFT path every channel is transformed once: the recording spectra
//! are kept for the whole search and each stimulus spectrum for its row.

use crate::fft::Fft;
use crate::xcorr::{
    CorrelationError, CorrelationMethod, argmax, check_lengths, fft_size_for,
    xcorr_valid_direct, xcorr_valid_spectra,
};
use rustfft::num_complex::Complex;

/// Best-matching channel pair between a stimulus and a recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelAlignment {
    /// Stimulus channel that the loopback reproduces.
    pub stimulus_channel: usize,
    /// Recording channel carrying the loopback.
    pub recording_channel: usize,
    /// Offset such that `recording[n + lag_samples] ≈ stimulus[n]`.
    pub lag_samples: usize,
    /// Correlation value at `lag_samples`.
    pub correlation: f64,
}

impl ChannelAlignment {
    /// The recording channel that is not the loopback (stereo recordings).
    pub fn sensor_channel(&self) -> usize {
        1 - self.recording_channel
    }

    /// Lag converted to milliseconds at `sample_rate`.
    pub fn lag_ms(&self, sample_rate: u32) -> f64 {
        self.lag_samples as f64 / f64::from(sample_rate) * 1000.0
    }
}

/// Brute-force channel pairing by maximum cross-correlation.
///
/// # Example
///
/// ```rust
/// use rec2taps_analysis::ChannelAligner;
///
/// let stim = [1.0f32, -1.0, 0.5, 0.0];
/// let silent = [0.0f32; 4];
/// let mut loopback = vec![0.0f32; 7];
/// loopback[3..].copy_from_slice(&stim);
/// let sensor = vec![0.0f32; 7];
///
/// let alignment = ChannelAligner::new()
///     .align(&[&stim, &silent], &[&sensor, &loopback])
///     .unwrap();
/// assert_eq!(alignment.stimulus_channel, 0);
/// assert_eq!(alignment.recording_channel, 1);
/// assert_eq!(alignment.lag_samples, 3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelAligner {
    method: CorrelationMethod,
}

impl ChannelAligner {
    /// Aligner that picks the correlation method automatically.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a correlation method.
    pub fn with_method(mut self, method: CorrelationMethod) -> Self {
        self.method = method;
        self
    }

    /// Find the stimulus/recording channel pair with the highest correlation.
    ///
    /// Stimulus channels form the outer loop and recording channels the inner
    /// one; on an exact tie the first pair in that order is kept. Any pair
    /// whose recording channel is shorter than its stimulus channel fails the
    /// whole search with [`CorrelationError::TooShort`].
    pub fn align(
        &self,
        stimulus: &[&[f32]],
        recording: &[&[f32]],
    ) -> Result<ChannelAlignment, CorrelationError> {
        let mut use_fft = false;
        for stim in stimulus {
            for rec in recording {
                let out_len = check_lengths(stim, rec)?;
                use_fft |= self.method.uses_fft(stim.len(), out_len);
            }
        }

        let spectral = if use_fft {
            Some(SpectralPlan::new(recording)?)
        } else {
            None
        };

        let mut best: Option<ChannelAlignment> = None;

        for (stimulus_channel, stim) in stimulus.iter().enumerate() {
            let stim_spectrum = match &spectral {
                Some(plan) => Some(plan.fft.forward_real(stim)?),
                None => None,
            };

            for (recording_channel, rec) in recording.iter().enumerate() {
                let correlation = match (&spectral, &stim_spectrum) {
                    (Some(plan), Some(spectrum)) => xcorr_valid_spectra(
                        &plan.fft,
                        spectrum,
                        &plan.recording[recording_channel],
                        rec.len() - stim.len() + 1,
                    )?,
                    _ => xcorr_valid_direct(stim, rec)?,
                };
                let Some((lag_samples, value)) = argmax(&correlation) else {
                    continue;
                };

                if best.is_none_or(|b| value > b.correlation) {
                    best = Some(ChannelAlignment {
                        stimulus_channel,
                        recording_channel,
                        lag_samples,
                        correlation: value,
                    });
                }
            }
        }

        best.ok_or(CorrelationError::Empty)
    }
}

/// One FFT size for the whole search plus the spectrum of every recording channel.
struct SpectralPlan {
    fft: Fft,
    recording: Vec<Vec<Complex<f64>>>,
}

impl SpectralPlan {
    fn new(recording: &[&[f32]]) -> Result<Self, CorrelationError> {
        let max_len = recording.iter().map(|r| r.len()).max().unwrap_or(0);
        let fft = Fft::new(fft_size_for(max_len));
        let recording = recording
            .iter()
            .map(|r| fft.forward_real(r))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { fft, recording })
    }
}
