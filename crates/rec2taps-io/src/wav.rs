//! WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV header metadata, reported alongside decoded samples.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

fn wav_info<R: std::io::Read>(reader: &WavReader<R>) -> WavInfo {
    let spec = reader.spec();
    let total_samples = u64::from(reader.len()); // total across all channels
    let num_frames = total_samples / u64::from(spec.channels.max(1));
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    }
}

/// WAV file specification used when writing.
#[derive(Debug, Clone, Copy)]
pub struct WavSpec {
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32; 32 writes IEEE float).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl WavSpec {
    /// Check that the bit depth is one the writer can encode.
    fn validate(&self) -> Result<()> {
        match self.bits_per_sample {
            8 | 16 | 24 | 32 => Ok(()),
            bits => Err(Error::UnsupportedFormat(format!(
                "cannot write {bits}-bit samples (expected 8, 16, 24 or 32)"
            ))),
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: 2,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// A two-channel signal with equal-length channels.
///
/// # Example
///
/// ```rust
/// use rec2taps_io::StereoSignal;
///
/// let signal = StereoSignal::from_interleaved(&[1.0, -1.0, 2.0, -2.0]);
/// assert_eq!(signal.len(), 2);
/// assert_eq!(signal.channel(1), &[-1.0, -2.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StereoSignal {
    /// Channel 0 samples.
    pub left: Vec<f32>,
    /// Channel 1 samples.
    pub right: Vec<f32>,
}

impl StereoSignal {
    /// Create a stereo signal from its two channels.
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Self {
        debug_assert_eq!(left.len(), right.len(), "Channels must have same length");
        Self { left, right }
    }

    /// Number of sample frames.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Check if the signal has no frames.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Samples of channel `index` (0 or 1).
    ///
    /// # Panics
    ///
    /// Panics if `index > 1`.
    pub fn channel(&self, index: usize) -> &[f32] {
        match index {
            0 => &self.left,
            1 => &self.right,
            _ => panic!("stereo signal has no channel {index}"),
        }
    }

    /// Both channels, in order.
    pub fn channels(&self) -> [&[f32]; 2] {
        [&self.left, &self.right]
    }

    /// Create from interleaved format (L, R, L, R, ...). A trailing odd sample is dropped.
    pub fn from_interleaved(interleaved: &[f32]) -> Self {
        let len = interleaved.len() / 2;
        let mut left = Vec::with_capacity(len);
        let mut right = Vec::with_capacity(len);

        for chunk in interleaved.chunks_exact(2) {
            left.push(chunk[0]);
            right.push(chunk[1]);
        }

        Self { left, right }
    }
}

/// Read a stereo WAV file, returning samples normalized to `[-1, 1)` and the
/// header metadata.
///
/// Integer PCM is scaled by `2^(bits - 1)`; float files are read as-is.
/// Anything other than exactly two channels is rejected with
/// [`Error::ChannelCount`].
///
/// # Example
/// ```ignore
/// let (signal, info) = read_wav_stereo("recording.wav")?;
/// println!("Loaded {} frames at {} Hz", signal.len(), info.sample_rate);
/// ```
pub fn read_wav_stereo<P: AsRef<Path>>(path: P) -> Result<(StereoSignal, WavInfo)> {
    let reader = WavReader::open(path)?;
    let info = wav_info(&reader);

    if info.channels != 2 {
        return Err(Error::ChannelCount {
            channels: info.channels,
        });
    }

    let all_samples: Vec<f32> = match info.format {
        WavFormat::IeeeFloat => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        WavFormat::Pcm => {
            let bits = info.bits_per_sample;
            if !(1..=32).contains(&bits) {
                return Err(Error::UnsupportedFormat(format!("{bits}-bit integer PCM")));
            }
            let max_val = (1i64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    Ok((StereoSignal::from_interleaved(&all_samples), info))
}

/// Write a stereo signal to a WAV file.
///
/// 32-bit writes IEEE float; 8, 16 and 24 bits write integer PCM. Other depths
/// fail with [`Error::UnsupportedFormat`] before the file is created.
///
/// # Example
/// ```ignore
/// let signal = StereoSignal::new(vec![0.0; 48000], vec![0.0; 48000]);
/// write_wav_stereo("output.wav", &signal, WavSpec::default())?;
/// ```
pub fn write_wav_stereo<P: AsRef<Path>>(path: P, signal: &StereoSignal, spec: WavSpec) -> Result<()> {
    spec.validate()?;
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for (l, r) in signal.left.iter().zip(signal.right.iter()) {
            writer.write_sample(*l)?;
            writer.write_sample(*r)?;
        }
    } else {
        let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
        for (l, r) in signal.left.iter().zip(signal.right.iter()) {
            let int_l = (*l * max_val).clamp(-max_val, max_val - 1.0) as i32;
            let int_r = (*r * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_l)?;
            writer.write_sample(int_r)?;
        }
    }

    writer.finalize()?;
    Ok(())
}
