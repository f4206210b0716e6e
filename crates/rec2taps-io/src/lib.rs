//! Audio input layer for rec2taps.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav_stereo`] (samples plus [`WavInfo`] metadata)
//!   and [`write_wav_stereo`] for two-channel stimulus and recording files
//! - **Decoding seam**: the [`AudioDecoder`] trait and its WAV implementation
//!   [`WavDecoder`], which the extraction pipeline takes as a collaborator
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rec2taps_io::{AudioDecoder, WavDecoder};
//!
//! let decoded = WavDecoder.decode("recording.wav".as_ref())?;
//! println!("{} frames at {} Hz", decoded.signal.len(), decoded.sample_rate);
//! ```

mod decode;
mod wav;

pub use decode::{AudioDecoder, DecodedAudio, WavDecoder};
pub use wav::{
    StereoSignal, WavFormat, WavInfo, WavSpec, read_wav_stereo, write_wav_stereo,
};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file does not have exactly two channels.
    #[error("expected 2 channels, found {channels}")]
    ChannelCount {
        /// Channel count found in the file header.
        channels: u16,
    },

    /// The sample encoding is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
