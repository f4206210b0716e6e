//! Tap peak detection for FSR sensor signals.
//!
//! A sensor trace is mostly a noise floor with short pressure bumps. The
//! detector zeroes everything below an adaptive amplitude threshold, then keeps
//! local maxima that are prominent enough and far enough apart:
//!
//! ```text
//! threshold = std(x) · prominence_multiplier
//! rect[n]   = x[n] if x[n] >= threshold else 0
//! peaks     = local maxima of rect with prominence >= threshold,
//!             thinned to min_distance (most prominent peak wins)
//! ```

use crate::dynamics::std_dev;

/// Adaptive-threshold peak picker.
///
/// # Example
///
/// ```rust
/// use rec2taps_analysis::PeakDetector;
///
/// let mut signal = vec![0.0f32; 1000];
/// signal[200] = 1.0;
/// signal[700] = 0.8;
///
/// let peaks = PeakDetector::new(5.0, 2.0).detect(&signal, 1000);
/// assert_eq!(peaks, vec![200, 700]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakDetector {
    /// Minimum spacing between reported peaks, in milliseconds.
    pub min_distance_ms: f64,
    /// Prominence threshold as a multiple of the signal standard deviation.
    pub prominence: f64,
}

impl PeakDetector {
    /// Create a detector with the given spacing and prominence multiplier.
    pub fn new(min_distance_ms: f64, prominence: f64) -> Self {
        Self {
            min_distance_ms,
            prominence,
        }
    }

    /// Amplitude threshold for `signal`: its standard deviation times the multiplier.
    pub fn threshold(&self, signal: &[f32]) -> f64 {
        std_dev(signal) * self.prominence
    }

    /// Detect peaks in `signal`, returning ascending sample indices.
    pub fn detect(&self, signal: &[f32], sample_rate: u32) -> Vec<usize> {
        let threshold = self.threshold(signal);
        let rectified = rectify(signal, threshold);
        let distance = distance_in_samples(self.min_distance_ms, sample_rate);

        find_peaks(&rectified, threshold, distance)
    }
}

/// Copy of `signal` with every sample strictly below `threshold` set to zero.
pub fn rectify(signal: &[f32], threshold: f64) -> Vec<f32> {
    signal
        .iter()
        .map(|&x| if f64::from(x) < threshold { 0.0 } else { x })
        .collect()
}

/// Convert a millisecond spacing to whole samples, rounding up, never below 1.
pub fn distance_in_samples(distance_ms: f64, sample_rate: u32) -> usize {
    let samples = (distance_ms * f64::from(sample_rate) / 1000.0).ceil();
    if samples.is_finite() && samples > 1.0 {
        samples as usize
    } else {
        1
    }
}

/// Indices of local maxima.
///
/// A sample is a maximum when it is strictly greater than its left neighbour
/// and the run of equal samples it starts is followed by a strictly smaller
/// one. Flat tops report their midpoint (rounded down). The first and last
/// samples are never maxima.
pub fn local_maxima(x: &[f32]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }

    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut i_ahead = i + 1;
            while i_ahead < i_max && x[i_ahead] == x[i] {
                i_ahead += 1;
            }

            if x[i_ahead] < x[i] {
                let left_edge = i;
                let right_edge = i_ahead - 1;
                peaks.push((left_edge + right_edge) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }

    peaks
}

/// Prominence of each peak.
///
/// Walks outwards from the peak on each side until a strictly higher sample
/// (or the signal edge) and takes the lowest point seen. The prominence is the
/// peak height above the higher of those two minima.
pub fn prominences(x: &[f32], peaks: &[usize]) -> Vec<f32> {
    peaks
        .iter()
        .map(|&peak| {
            let height = x[peak];
            let left_min = x[..=peak]
                .iter()
                .rev()
                .take_while(|&&v| v <= height)
                .fold(height, |m, &v| m.min(v));
            let right_min = x[peak..]
                .iter()
                .take_while(|&&v| v <= height)
                .fold(height, |m, &v| m.min(v));

            height - left_min.max(right_min)
        })
        .collect()
}

/// Thin `peaks` so no two survivors are closer than `distance` samples.
///
/// Peaks are visited from highest to lowest priority; each kept peak removes
/// its too-close neighbours. Equal priorities visit the later peak first.
/// Returns a keep-mask parallel to `peaks`.
pub fn select_by_distance(peaks: &[usize], priority: &[f32], distance: usize) -> Vec<bool> {
    let n = peaks.len();
    let mut keep = vec![true; n];

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        priority[a]
            .partial_cmp(&priority[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for &i in order.iter().rev() {
        if !keep[i] {
            continue;
        }

        let mut j = i;
        while j > 0 && peaks[i] - peaks[j - 1] < distance {
            keep[j - 1] = false;
            j -= 1;
        }

        let mut k = i + 1;
        while k < n && peaks[k] - peaks[i] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    keep
}

/// Local maxima of `x` with prominence at least `min_prominence`, spaced at
/// least `distance` samples apart.
pub fn find_peaks(x: &[f32], min_prominence: f64, distance: usize) -> Vec<usize> {
    let candidates = local_maxima(x);
    let proms = prominences(x, &candidates);

    let (peaks, proms): (Vec<usize>, Vec<f32>) = candidates
        .into_iter()
        .zip(proms)
        .filter(|&(_, p)| f64::from(p) >= min_prominence)
        .unzip();

    if distance <= 1 {
        return peaks;
    }

    let keep = select_by_distance(&peaks, &proms, distance);
    peaks
        .into_iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(p))
        .collect()
}
