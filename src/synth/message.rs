#[cfg(feature = "rtrb")]
use rtrb::Consumer;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Control events a host queues for the synth.
///
/// They are applied on the audio thread right before `render`, which keeps
/// control updates and rendering from ever overlapping.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    SetParameter { index: u8, value: i32 },
    PitchBend { value: u16 },
    ChannelPressure { value: u8 },
    Aftertouch { note: u8, value: u8 },
    AllNotesOff,
    Reset,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}
