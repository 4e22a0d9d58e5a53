//! Low-level DSP primitives composed by the synth voice.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside the voice struct. Each one owns its own state and
//! sample rate; the voice only drives them through their configure/advance
//! methods.

/// Attack/decay/sustain/release envelope generators.
pub mod envelope;
/// State-variable filter with simultaneous LP/BP/HP/notch outputs.
pub mod filter;
/// Band-limited (PolyBLEP) oscillator.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeGenerator, EnvelopeKind};
pub use filter::{FilterMix, FilterOutputs, FilterType, SVFilter};
pub use oscillator::{PolyBlepOscillator, Waveform};

/// Convert a (fractional) note number to frequency in Hz.
///
/// Reference pitch is A4 = note 69 = 440 Hz, written relative to A-1 so that
/// fractional notes from envelope modulation map smoothly.
#[inline]
pub fn note_to_freq(note: f32) -> f32 {
    (440.0 / 32.0) * 2.0_f32.powf((note - 9.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert!((note_to_freq(69.0) - 440.0).abs() < 1e-3);
    }

    #[test]
    fn octave_doubles_frequency() {
        let low = note_to_freq(57.0);
        let high = note_to_freq(69.0);
        assert!((high / low - 2.0).abs() < 1e-5);
    }
}
