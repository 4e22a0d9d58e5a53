// Purpose: the synth voice, its parameter table and control surface
// This layer owns the DSP primitives and wires them into one signal path

pub mod flags;
pub mod gate;
pub mod message;
pub mod params;
pub mod voice;

pub use message::{MessageReceiver, SynthMessage};
pub use params::{Coefficients, Param};
pub use voice::Synth;
