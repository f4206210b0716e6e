//! Valid-mode cross-correlation, time-domain (direct) and frequency-domain (FFT).
//!
//! Only lags at which the template lies entirely inside the signal are
//! evaluated: no zero-padding at the edges and no circular wrap-around.
//!
//! # Mathematical Definition
//!
//! For a template `t` of length M and a signal `s` of length N ≥ M:
//!
//! ```text
//! c[k] = Σ_{n=0}^{M-1} t[n] · s[n + k],   k = 0, 1, …, N - M
//! ```
//!
//! This equals a valid-mode linear convolution of `s` with the time-reversed
//! template. When `s[n] = t[n - D]`, `c` peaks at `k = D`: a positive lag means
//! the signal is a delayed copy of the template.
//!
//! # FFT-based Computation
//!
//! ```text
//! c = IFFT( conj(T(f)) · S(f) )[0 ..= N - M]
//! ```
//!
//! # References
//!
//! - Oppenheim & Schafer, "Discrete-Time Signal Processing" (3rd ed.), section 2.8.

use crate::fft::Fft;
use realfft::FftError;
use rustfft::num_complex::Complex;

/// Above this many multiply-adds [`CorrelationMethod::Auto`] switches to the FFT.
const DIRECT_WORK_LIMIT: usize = 1 << 20;

/// Why a valid-mode correlation produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CorrelationError {
    /// The signal is shorter than the template, so no lag fully overlaps.
    #[error("signal ({signal_len} samples) is shorter than template ({template_len} samples)")]
    TooShort {
        /// Template length in samples.
        template_len: usize,
        /// Signal length in samples.
        signal_len: usize,
    },

    /// The template has no samples.
    #[error("correlation template is empty")]
    Empty,

    /// A spectrum did not match the planned FFT size.
    #[error("FFT buffer does not match the planned transform size")]
    Transform,
}

impl From<FftError> for CorrelationError {
    fn from(_: FftError) -> Self {
        CorrelationError::Transform
    }
}

/// How to evaluate the correlation sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationMethod {
    /// O(M · (N - M + 1)) direct sum.
    Direct,
    /// O(N log N) via zero-padded FFT.
    Fft,
    /// Direct for small workloads, FFT otherwise.
    #[default]
    Auto,
}

impl CorrelationMethod {
    /// Whether a template of `template_len` against `out_len` lags goes through the FFT.
    pub(crate) fn uses_fft(self, template_len: usize, out_len: usize) -> bool {
        match self {
            CorrelationMethod::Direct => false,
            CorrelationMethod::Fft => true,
            CorrelationMethod::Auto => out_len.saturating_mul(template_len) > DIRECT_WORK_LIMIT,
        }
    }
}

/// Number of valid lags, or why there are none.
pub(crate) fn check_lengths(template: &[f32], signal: &[f32]) -> Result<usize, CorrelationError> {
    if template.is_empty() {
        return Err(CorrelationError::Empty);
    }
    if signal.len() < template.len() {
        return Err(CorrelationError::TooShort {
            template_len: template.len(),
            signal_len: signal.len(),
        });
    }
    Ok(signal.len() - template.len() + 1)
}

/// FFT size for correlating against signals up to `max_signal_len` samples.
///
/// For lags `0..=N-M` the index `n + k` never passes `N - 1`, so padding to
/// the signal length keeps the valid part free of wrap-around.
pub(crate) fn fft_size_for(max_signal_len: usize) -> usize {
    max_signal_len.next_power_of_two().max(2)
}

/// Direct time-domain valid-mode correlation.
///
/// Returns `N - M + 1` values, entry `k` being `Σ t[n] · s[n + k]`.
pub fn xcorr_valid_direct(template: &[f32], signal: &[f32]) -> Result<Vec<f64>, CorrelationError> {
    let out_len = check_lengths(template, signal)?;

    let result = (0..out_len)
        .map(|lag| {
            template
                .iter()
                .zip(&signal[lag..lag + template.len()])
                .map(|(&t, &s)| f64::from(t) * f64::from(s))
                .sum()
        })
        .collect();

    Ok(result)
}

/// Valid-mode correlation from spectra already computed with `fft`.
///
/// Lets a caller transform each channel once and correlate it against many
/// others. Returns the first `out_len` lags.
pub fn xcorr_valid_spectra(
    fft: &Fft,
    template: &[Complex<f64>],
    signal: &[Complex<f64>],
    out_len: usize,
) -> Result<Vec<f64>, CorrelationError> {
    if template.len() != signal.len() {
        return Err(CorrelationError::Transform);
    }

    let mut product: Vec<Complex<f64>> = signal
        .iter()
        .zip(template)
        .map(|(s, t)| s * t.conj())
        .collect();

    let mut correlation = fft.inverse_real(&mut product)?;
    correlation.truncate(out_len);
    Ok(correlation)
}

/// FFT-based valid-mode correlation. Same output layout as [`xcorr_valid_direct`].
pub fn xcorr_valid_fft(template: &[f32], signal: &[f32]) -> Result<Vec<f64>, CorrelationError> {
    let out_len = check_lengths(template, signal)?;

    let fft = Fft::new(fft_size_for(signal.len()));
    let spec_s = fft.forward_real(signal)?;
    let spec_t = fft.forward_real(template)?;

    xcorr_valid_spectra(&fft, &spec_t, &spec_s, out_len)
}

/// Valid-mode correlation using the requested evaluation method.
pub fn xcorr_valid(
    template: &[f32],
    signal: &[f32],
    method: CorrelationMethod,
) -> Result<Vec<f64>, CorrelationError> {
    let out_len = check_lengths(template, signal)?;
    if method.uses_fft(template.len(), out_len) {
        xcorr_valid_fft(template, signal)
    } else {
        xcorr_valid_direct(template, signal)
    }
}

/// Index and value of the largest correlation value.
///
/// Ties resolve to the first (smallest) index. Returns `None` for an empty slice.
pub fn argmax(correlation: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in correlation.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best
}
