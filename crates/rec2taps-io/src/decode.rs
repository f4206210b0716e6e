//! Audio decoding seam used by the extraction pipeline.

use crate::Result;
use crate::wav::{StereoSignal, read_wav_stereo};
use std::path::Path;

/// A fully decoded stereo file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel data.
    pub signal: StereoSignal,
}

/// Turns a file path into a stereo signal and its sample rate.
///
/// Implementations must fail with a distinguishable error for missing files
/// and unsupported formats.
pub trait AudioDecoder {
    /// Decode the whole file into memory.
    fn decode(&self, path: &Path) -> Result<DecodedAudio>;
}

/// Decoder for stereo WAV files (integer PCM or IEEE float).
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio> {
        let (signal, info) = read_wav_stereo(path)?;

        tracing::debug!(
            "decoded {}: {} frames at {} Hz, {}-bit {:?}, {:.3} s",
            path.display(),
            signal.len(),
            info.sample_rate,
            info.bits_per_sample,
            info.format,
            info.duration_secs
        );

        Ok(DecodedAudio {
            sample_rate: info.sample_rate,
            signal,
        })
    }
}

impl<D: AudioDecoder + ?Sized> AudioDecoder for &D {
    fn decode(&self, path: &Path) -> Result<DecodedAudio> {
        (**self).decode(path)
    }
}
