//! Real-input FFT wrapper used by the frequency-domain correlation path.
//!
//! Correlations over whole recordings sum millions of products, so the
//! transform runs in `f64` even though samples are stored as `f32`. Inputs
//! are real, so only the `size / 2 + 1` non-redundant bins are kept.

use realfft::{ComplexToReal, FftError, RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;
use std::sync::Arc;

/// Forward/inverse real FFT pair planned for one size.
pub struct Fft {
    forward: Arc<dyn RealToComplex<f64>>,
    inverse: Arc<dyn ComplexToReal<f64>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);

        Self {
            forward,
            inverse,
            size,
        }
    }

    /// Zero-pad a real signal to the FFT size and transform it.
    ///
    /// Returns `size / 2 + 1` bins. Samples past the FFT size are ignored.
    pub fn forward_real(&self, input: &[f32]) -> Result<Vec<Complex<f64>>, FftError> {
        let mut buffer = self.forward.make_input_vec();
        for (b, &x) in buffer.iter_mut().zip(input) {
            *b = f64::from(x);
        }

        let mut spectrum = self.forward.make_output_vec();
        self.forward.process(&mut buffer, &mut spectrum)?;
        Ok(spectrum)
    }

    /// Inverse transform of a half spectrum, normalized by `1 / size`.
    ///
    /// The spectrum is used as scratch space and left in an unspecified state.
    pub fn inverse_real(&self, spectrum: &mut [Complex<f64>]) -> Result<Vec<f64>, FftError> {
        // DC and Nyquist bins of a real signal are real.
        if let Some(first) = spectrum.first_mut() {
            first.im = 0.0;
        }
        if let Some(last) = spectrum.last_mut().filter(|_| self.size % 2 == 0) {
            last.im = 0.0;
        }

        let mut output = self.inverse.make_output_vec();
        self.inverse.process(spectrum, &mut output)?;

        let scale = 1.0 / self.size as f64;
        for x in &mut output {
            *x *= scale;
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_fft_roundtrip() {
        let fft = Fft::new(256);

        let input: Vec<f32> = (0..200)
            .map(|i| (2.0 * PI * 10.0 * i as f32 / 256.0).sin())
            .collect();

        let mut spectrum = fft.forward_real(&input).unwrap();
        let output = fft.inverse_real(&mut spectrum).unwrap();

        assert_eq!(output.len(), 256);
        for (i, &y) in output.iter().enumerate() {
            let expected = input.get(i).copied().map_or(0.0, f64::from);
            assert!((y - expected).abs() < 1e-9, "Mismatch at {i}: {y} vs {expected}");
        }
    }

    #[test]
    fn test_dc_detection() {
        let fft = Fft::new(256);

        let spectrum = fft.forward_real(&[1.0; 256]).unwrap();

        let dc_mag = spectrum[0].norm();
        let other_mag: f64 = spectrum[1..].iter().map(|c| c.norm()).sum();

        assert!(dc_mag > other_mag * 10.0);
    }

    #[test]
    fn test_half_spectrum_length() {
        let fft = Fft::new(128);
        assert_eq!(fft.forward_real(&[1.0; 10]).unwrap().len(), 65);
    }

    #[test]
    fn test_wrong_spectrum_length_is_error() {
        let fft = Fft::new(64);
        let mut short = vec![Complex::new(0.0, 0.0); 10];
        assert!(fft.inverse_real(&mut short).is_err());
    }
}
