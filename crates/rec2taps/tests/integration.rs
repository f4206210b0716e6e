//! End-to-end extraction tests on WAV files written to a temp directory.

use rec2taps::{ExtractConfig, ExtractError, PgmRenderer, TapExtractor, extract_peaks};
use rec2taps_io::{StereoSignal, WavSpec, write_wav_stereo};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn white_noise(n: usize, seed: u32) -> Vec<f32> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as i32 as f32) / (i32::MAX as f32)
        })
        .collect()
}

fn add_tap(signal: &mut [f32], at: usize, half_width: usize, height: f32) {
    for offset in 0..=half_width {
        let v = height * (1.0 - offset as f32 / (half_width + 1) as f32);
        signal[at + offset] += v;
        if offset > 0 {
            signal[at - offset] += v;
        }
    }
}

fn write(dir: &TempDir, name: &str, sample_rate: u32, left: Vec<f32>, right: Vec<f32>) -> PathBuf {
    let path = dir.path().join(name);
    let spec = WavSpec {
        sample_rate,
        bits_per_sample: 32,
    };
    write_wav_stereo(&path, &StereoSignal::new(left, right), spec).unwrap();
    path
}

/// Stimulus noise on the left channel, silent right channel.
fn write_stimulus(dir: &TempDir, sample_rate: u32, len: usize) -> (PathBuf, Vec<f32>) {
    let noise = white_noise(len, 0x5EED_1234);
    let path = write(dir, "stimulus.wav", sample_rate, noise.clone(), vec![0.0; len]);
    (path, noise)
}

fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() <= tol, "got {a} ms, expected {e} ms");
    }
}

// ===========================================================================
// 1. Reference scenario
// ===========================================================================

#[test]
fn impulses_on_left_with_loopback_on_right() {
    let dir = TempDir::new().unwrap();
    let (stimulus, noise) = write_stimulus(&dir, 48000, 12_000);

    let lag = 2140;
    let mut loopback = vec![0.0f32; 12_000 + lag];
    loopback[lag..].copy_from_slice(&noise);
    let mut sensor = vec![0.0f32; 12_000 + lag];
    for idx in [1000, 5000, 9000] {
        sensor[idx] = 1.0;
    }
    let recording = write(&dir, "recording.wav", 48000, sensor, loopback);

    let config = ExtractConfig::default().with_min_distance_ms(50.0);
    let report = TapExtractor::new()
        .extract_report(&stimulus, &recording, &config)
        .unwrap();

    assert_eq!(report.alignment.stimulus_channel, 0);
    assert_eq!(report.alignment.recording_channel, 1);
    assert_eq!(report.alignment.lag_samples, lag);
    assert_eq!(report.peak_indices, vec![1000, 5000, 9000]);

    let expected: Vec<f64> = [1000.0, 5000.0, 9000.0]
        .iter()
        .map(|idx| (idx - 2140.0) / 48.0)
        .collect();
    assert_close(&report.peak_times_ms, &expected, 1e-9);
}

// ===========================================================================
// 2. Round trip: reported tap time does not depend on the loopback delay
// ===========================================================================

#[test]
fn tap_times_independent_of_delay() {
    let sr = 8000;
    let stim_len = 4000;
    let taps_ms = [100.0, 300.0, 450.0];

    for delay_ms in [0.0, 10.0, 37.5, 100.0] {
        let dir = TempDir::new().unwrap();
        let (stimulus, noise) = write_stimulus(&dir, sr, stim_len);

        let lag = (delay_ms * f64::from(sr) / 1000.0) as usize;
        let rec_len = stim_len + lag + 1000;
        let mut loopback = vec![0.0f32; rec_len];
        loopback[lag..lag + stim_len].copy_from_slice(&noise);
        let mut sensor = vec![0.0f32; rec_len];
        for t in taps_ms {
            add_tap(&mut sensor, lag + (t * f64::from(sr) / 1000.0) as usize, 16, 0.8);
        }
        let recording = write(&dir, "recording.wav", sr, sensor, loopback);

        let taps = extract_peaks(&stimulus, &recording, &ExtractConfig::default()).unwrap();
        assert_close(&taps, &taps_ms, 1000.0 / f64::from(sr));
    }
}

// ===========================================================================
// 3. Inverted sensor wiring
// ===========================================================================

#[test]
fn inverted_sensor_matches_plain_sensor() {
    let dir = TempDir::new().unwrap();
    let sr = 8000;
    let (stimulus, noise) = write_stimulus(&dir, sr, 2000);

    let mut loopback = vec![0.0f32; 3000];
    loopback[400..2400].copy_from_slice(&noise);
    let mut sensor = vec![0.0f32; 3000];
    add_tap(&mut sensor, 900, 12, 1.0);
    add_tap(&mut sensor, 2200, 12, 0.7);
    let negated: Vec<f32> = sensor.iter().map(|x| -x).collect();

    // Sensor on the right this time, loopback on the left.
    let plain = write(&dir, "plain.wav", sr, loopback.clone(), sensor);
    let flipped = write(&dir, "flipped.wav", sr, loopback, negated);

    let config = ExtractConfig::default();
    let expected = extract_peaks(&stimulus, &plain, &config).unwrap();
    let actual = extract_peaks(&stimulus, &flipped, &config.clone().with_invert_sensor(true)).unwrap();

    assert_eq!(expected, actual);
    assert_close(&expected, &[62.5, 225.0], 1e-9);

    // Without inversion the negative bumps are never detected.
    assert!(extract_peaks(&stimulus, &flipped, &config).unwrap().is_empty());
}

// ===========================================================================
// 4. Input validation
// ===========================================================================

#[test]
fn mismatched_sample_rates() {
    let dir = TempDir::new().unwrap();
    let stimulus = write(&dir, "sti.wav", 44100, vec![0.0; 100], vec![0.0; 100]);
    let recording = write(&dir, "rec.wav", 48000, vec![0.0; 200], vec![0.0; 200]);

    let err = extract_peaks(&stimulus, &recording, &ExtractConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::UnequalSampleRate {
            stimulus_rate: 44100,
            recording_rate: 48000,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        format!(
            "{} and {} do not have the same sample rate (44100 != 48000)",
            stimulus.display(),
            recording.display()
        )
    );
}

#[test]
fn recording_shorter_than_stimulus() {
    let dir = TempDir::new().unwrap();
    let stimulus = write(&dir, "sti.wav", 48000, vec![0.0; 10], vec![0.0; 10]);
    let recording = write(&dir, "rec.wav", 48000, vec![0.0; 8], vec![0.0; 8]);

    let err = extract_peaks(&stimulus, &recording, &ExtractConfig::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "Stimuli file ({}) is shorter than recording file ({}).",
            stimulus.display(),
            recording.display()
        )
    );
}

#[test]
fn missing_recording_names_the_file() {
    let dir = TempDir::new().unwrap();
    let stimulus = write(&dir, "sti.wav", 48000, vec![0.0; 10], vec![0.0; 10]);
    let missing = dir.path().join("nope.wav");

    let err = extract_peaks(&stimulus, &missing, &ExtractConfig::default()).unwrap_err();
    match err {
        ExtractError::Decode { ref path, .. } => assert_eq!(path, &missing),
        other => panic!("unexpected error: {other}"),
    }
}

// ===========================================================================
// 5. Debug plot
// ===========================================================================

#[test]
fn debug_plot_written_next_to_results() {
    let dir = TempDir::new().unwrap();
    let sr = 8000;
    let (stimulus, noise) = write_stimulus(&dir, sr, 2000);
    let mut loopback = vec![0.0f32; 2500];
    loopback[100..2100].copy_from_slice(&noise);
    let mut sensor = vec![0.0f32; 2500];
    add_tap(&mut sensor, 1000, 10, 1.0);
    let recording = write(&dir, "recording.wav", sr, sensor, loopback);

    let plot: &Path = &dir.path().join("taps.pgm");
    let config = ExtractConfig::default().with_debug_plot(plot);
    let taps = TapExtractor::new()
        .with_renderer(PgmRenderer::new(200, 50))
        .extract(&stimulus, &recording, &config)
        .unwrap();

    assert_close(&taps, &[112.5], 1e-9);
    let content = std::fs::read_to_string(plot).unwrap();
    assert!(content.starts_with("P2"));
    assert!(content.contains("200 50"));
}

#[test]
fn failed_plot_still_returns_taps() {
    let dir = TempDir::new().unwrap();
    let sr = 8000;
    let (stimulus, noise) = write_stimulus(&dir, sr, 2000);
    let mut loopback = vec![0.0f32; 2500];
    loopback[..2000].copy_from_slice(&noise);
    let mut sensor = vec![0.0f32; 2500];
    add_tap(&mut sensor, 1600, 10, 1.0);
    let recording = write(&dir, "recording.wav", sr, sensor, loopback);

    let config = ExtractConfig::default().with_debug_plot(dir.path().join("missing/dir/taps.pgm"));
    let taps = TapExtractor::new()
        .with_renderer(PgmRenderer::default())
        .extract(&stimulus, &recording, &config)
        .unwrap();
    assert_close(&taps, &[200.0], 1e-9);
}
