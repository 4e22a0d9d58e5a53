/// Channel-voice MIDI messages the synth understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    PolyAftertouch { channel: u8, key: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    /// 14-bit bend, 0x2000 is centered.
    PitchBend { channel: u8, value: u16 },
}

impl MidiEvent {
    /// Decode one message from raw bytes.
    ///
    /// Returns `None` for system messages, running status and truncated input.
    /// A note-on with velocity 0 is reported as a note-off.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status < 0x80 || status >= 0xf0 {
            return None;
        }
        let channel = status & 0x0f;
        let byte = |i: usize| data.get(i).map(|b| b & 0x7f);

        let event = match status & 0xf0 {
            0x80 => MidiEvent::NoteOff {
                channel,
                key: byte(0)?,
                velocity: byte(1)?,
            },
            0x90 => match (byte(0)?, byte(1)?) {
                (key, 0) => MidiEvent::NoteOff {
                    channel,
                    key,
                    velocity: 0,
                },
                (key, velocity) => MidiEvent::NoteOn {
                    channel,
                    key,
                    velocity,
                },
            },
            0xa0 => MidiEvent::PolyAftertouch {
                channel,
                key: byte(0)?,
                pressure: byte(1)?,
            },
            0xb0 => MidiEvent::ControlChange {
                channel,
                controller: byte(0)?,
                value: byte(1)?,
            },
            0xc0 => MidiEvent::ProgramChange {
                channel,
                program: byte(0)?,
            },
            0xd0 => MidiEvent::ChannelPressure {
                channel,
                pressure: byte(0)?,
            },
            0xe0 => MidiEvent::PitchBend {
                channel,
                value: u16::from(byte(0)?) | (u16::from(byte(1)?) << 7),
            },
            _ => return None,
        };
        Some(event)
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::PolyAftertouch { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::ProgramChange { channel, .. }
            | MidiEvent::ChannelPressure { channel, .. }
            | MidiEvent::PitchBend { channel, .. } => channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_messages() {
        assert_eq!(
            MidiEvent::parse(&[0x91, 60, 100]),
            Some(MidiEvent::NoteOn { channel: 1, key: 60, velocity: 100 })
        );
        assert_eq!(
            MidiEvent::parse(&[0x80, 60, 10]),
            Some(MidiEvent::NoteOff { channel: 0, key: 60, velocity: 10 })
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        assert_eq!(
            MidiEvent::parse(&[0x90, 64, 0]),
            Some(MidiEvent::NoteOff { channel: 0, key: 64, velocity: 0 })
        );
    }

    #[test]
    fn pitch_bend_combines_seven_bit_halves() {
        assert_eq!(
            MidiEvent::parse(&[0xe3, 0x00, 0x40]),
            Some(MidiEvent::PitchBend { channel: 3, value: 0x2000 })
        );
    }

    #[test]
    fn rejects_system_and_truncated_messages() {
        assert_eq!(MidiEvent::parse(&[]), None);
        assert_eq!(MidiEvent::parse(&[0xf8]), None);
        assert_eq!(MidiEvent::parse(&[0x40, 0x40]), None);
        assert_eq!(MidiEvent::parse(&[0x90, 60]), None);
    }
}
