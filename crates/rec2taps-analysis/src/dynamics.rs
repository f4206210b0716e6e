//! Amplitude statistics for sensor signals
//!
//! Sums are accumulated in `f64`; a few minutes of 48 kHz audio is enough to
//! lose precision in an `f32` accumulator.

/// Arithmetic mean of a signal. Returns 0 for an empty signal.
pub fn mean(signal: &[f32]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }

    signal.iter().map(|&x| f64::from(x)).sum::<f64>() / signal.len() as f64
}

/// Population standard deviation (divides by `n`, not `n - 1`).
///
/// Returns 0 for empty or constant signals.
pub fn std_dev(signal: &[f32]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }

    let mu = mean(signal);
    let var = signal
        .iter()
        .map(|&x| {
            let d = f64::from(x) - mu;
            d * d
        })
        .sum::<f64>()
        / signal.len() as f64;
    var.sqrt()
}
