//! Diagnostic waveform rendering.
//!
//! The pipeline hands the sensor trace and the detected tap times to a
//! [`WaveformRenderer`] when a debug plot is requested. [`PgmRenderer`] writes
//! an ASCII PGM (P2) image that any image viewer opens:
//!
//! - white background
//! - the waveform envelope (per-column min..max) in black
//! - a full-height gray line at every tap
//!
//! Time runs left to right; positive amplitude is up.

use std::io::{BufWriter, Write};
use std::path::Path;

/// Draws a sensor waveform with tap markers to a file.
pub trait WaveformRenderer {
    /// Render `amplitudes` sampled at `times_ms`, marking `peak_times_ms`.
    ///
    /// `times_ms` and `amplitudes` have equal length.
    fn render(
        &self,
        times_ms: &[f64],
        amplitudes: &[f32],
        peak_times_ms: &[f64],
        output: &Path,
    ) -> std::io::Result<()>;
}

const BACKGROUND: u8 = 255;
const WAVEFORM: u8 = 0;
const MARKER: u8 = 160;

/// Grayscale PGM renderer.
///
/// Both dimensions are at least one pixel; [`PgmRenderer::new`] clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgmRenderer {
    width: usize,
    height: usize,
}

impl Default for PgmRenderer {
    fn default() -> Self {
        Self::new(1600, 400)
    }
}

impl PgmRenderer {
    /// Renderer producing `width` x `height` images (each at least 1).
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Rasterize into a row-major pixel buffer.
    fn rasterize(&self, times_ms: &[f64], amplitudes: &[f32], peak_times_ms: &[f64]) -> Vec<u8> {
        let (width, height) = (self.width, self.height);
        let mut pixels = vec![BACKGROUND; width * height];

        let n = times_ms.len().min(amplitudes.len());
        if n == 0 {
            return pixels;
        }

        let t_start = times_ms[0];
        let t_span = (times_ms[n - 1] - t_start).max(f64::EPSILON);
        let column_of = |t: f64| -> Option<usize> {
            let pos = (t - t_start) / t_span * (width - 1) as f64;
            (pos.is_finite() && pos >= 0.0 && pos <= (width - 1) as f64)
                .then(|| pos.round() as usize)
        };

        let peak = amplitudes[..n]
            .iter()
            .fold(0.0f32, |m, &a| m.max(a.abs()))
            .max(f32::EPSILON);
        let row_of = |a: f32| -> usize {
            let norm = f64::from((a / peak).clamp(-1.0, 1.0));
            ((1.0 - norm) * 0.5 * (height - 1) as f64).round() as usize
        };

        for &t in peak_times_ms {
            if let Some(col) = column_of(t) {
                for row in 0..height {
                    pixels[row * width + col] = MARKER;
                }
            }
        }

        let mut envelope: Vec<Option<(f32, f32)>> = vec![None; width];
        for (&t, &a) in times_ms[..n].iter().zip(&amplitudes[..n]) {
            if let Some(col) = column_of(t) {
                envelope[col] = Some(match envelope[col] {
                    Some((lo, hi)) => (lo.min(a), hi.max(a)),
                    None => (a, a),
                });
            }
        }

        for (col, span) in envelope.iter().enumerate() {
            if let Some((lo, hi)) = *span {
                for row in row_of(hi)..=row_of(lo) {
                    pixels[row * width + col] = WAVEFORM;
                }
            }
        }

        pixels
    }
}

impl WaveformRenderer for PgmRenderer {
    fn render(
        &self,
        times_ms: &[f64],
        amplitudes: &[f32],
        peak_times_ms: &[f64],
        output: &Path,
    ) -> std::io::Result<()> {
        let pixels = self.rasterize(times_ms, amplitudes, peak_times_ms);
        let mut file = BufWriter::new(std::fs::File::create(output)?);

        writeln!(file, "P2")?;
        writeln!(file, "# rec2taps sensor waveform, {} taps", peak_times_ms.len())?;
        writeln!(file, "{} {}", self.width, self.height)?;
        writeln!(file, "255")?;

        for row in pixels.chunks(self.width) {
            for (i, pixel) in row.iter().enumerate() {
                if i > 0 {
                    write!(file, " ")?;
                }
                write!(file, "{pixel}")?;
            }
            writeln!(file)?;
        }

        file.flush()
    }
}
