use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// Convert a MIDI event on `channel_filter` into a synth message.
///
/// Control and program changes have no mapping and are dropped, as is
/// anything on another channel.
pub fn midi_to_message(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    if midi.channel() != channel_filter {
        return None;
    }

    match midi {
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::NoteOn {
            note: key,
            velocity,
        }),
        MidiEvent::NoteOff { key, .. } => Some(SynthMessage::NoteOff { note: key }),
        MidiEvent::PolyAftertouch { key, pressure, .. } => Some(SynthMessage::Aftertouch {
            note: key,
            value: pressure,
        }),
        MidiEvent::ChannelPressure { pressure, .. } => {
            Some(SynthMessage::ChannelPressure { value: pressure })
        }
        MidiEvent::PitchBend { value, .. } => Some(SynthMessage::PitchBend { value }),
        MidiEvent::ControlChange { .. } | MidiEvent::ProgramChange { .. } => None,
    }
}
