//! Error types for unit initialization.

use thiserror::Error;

/// Reasons the host's runtime description cannot be accepted.
///
/// Both are fatal to initialization: a synth that failed to initialize
/// renders silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InitError {
    /// The render loop is tuned for a single sample rate.
    #[error("unsupported sample rate: {rate} Hz (expected {expected} Hz)")]
    UnsupportedSampleRate {
        /// The rejected sample rate.
        rate: u32,
        /// The only accepted sample rate.
        expected: u32,
    },

    /// Output must be interleaved stereo.
    #[error("unsupported channel layout: {channels} output channels (expected {expected})")]
    UnsupportedChannelLayout {
        /// The rejected channel count.
        channels: usize,
        /// The only accepted channel count.
        expected: usize,
    },
}

impl InitError {
    /// Numeric status code reported back to the hosting runtime.
    pub fn code(&self) -> i8 {
        match self {
            InitError::UnsupportedSampleRate { .. } => crate::unit::ERR_SAMPLE_RATE,
            InitError::UnsupportedChannelLayout { .. } => crate::unit::ERR_GEOMETRY,
        }
    }
}
