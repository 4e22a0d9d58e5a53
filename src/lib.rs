pub mod dsp; // Oscillator, filter and envelope primitives
pub mod error;
pub mod io;
pub mod synth; // Voice controller, parameters and note/gate state
pub mod unit; // Static unit header and status codes

pub use dsp::note_to_freq;
pub use error::InitError;
pub use synth::{Param, Synth, SynthMessage};

/// The only sample rate the render loop accepts.
pub const SAMPLE_RATE: u32 = 48_000;
/// Output is interleaved stereo.
pub const OUTPUT_CHANNELS: usize = 2;
pub const MAX_BLOCK_SIZE: usize = 2048;
pub const NUM_PARAMS: usize = 24;
