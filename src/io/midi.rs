//! MIDI channel-voice messages as they cross the output boundary.
//!
//! Channels here are wire channels (0-15). Every 7-bit data field is masked
//! to 0-127 on encode.

/// Controller number for stereo pan.
pub const CC_PAN: u8 = 10;
/// Controller number for "all sound off".
pub const CC_ALL_SOUND_OFF: u8 = 123;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    pub fn note_on(channel: u8, key: u8, velocity: u8) -> Self {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        }
    }

    /// Note-Off with release velocity 0.
    pub fn note_off(channel: u8, key: u8) -> Self {
        MidiEvent::NoteOff {
            channel,
            key,
            velocity: 0,
        }
    }

    pub fn pan(channel: u8, value: u8) -> Self {
        MidiEvent::ControlChange {
            channel,
            controller: CC_PAN,
            value,
        }
    }

    pub fn all_sound_off(channel: u8) -> Self {
        MidiEvent::ControlChange {
            channel,
            controller: CC_ALL_SOUND_OFF,
            value: 0,
        }
    }

    /// Encode to wire bytes. Returns the buffer and the number of bytes used.
    pub fn to_bytes(&self) -> ([u8; 3], usize) {
        match *self {
            MidiEvent::NoteOn {
                channel,
                key,
                velocity,
            } => ([0x90 | (channel & 0x0F), key & 0x7F, velocity & 0x7F], 3),
            MidiEvent::NoteOff { channel, key, .. } => {
                ([0x80 | (channel & 0x0F), key & 0x7F, 0x00], 3)
            }
            MidiEvent::ControlChange {
                channel,
                controller,
                value,
            } => ([0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F], 3),
            MidiEvent::PitchBend { channel, value } => {
                let v = (value as i32 + 8192).clamp(0, 16383) as u16;
                (
                    [0xE0 | (channel & 0x0F), (v & 0x7F) as u8, ((v >> 7) & 0x7F) as u8],
                    3,
                )
            }
            MidiEvent::ProgramChange { channel, program } => {
                ([0xC0 | (channel & 0x0F), program & 0x7F, 0], 2)
            }
        }
    }

    /// Decode a channel-voice message. Note-On with velocity 0 is a Note-Off.
    /// Anything else (system messages, truncated input) yields `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let status = *bytes.first()?;
        let channel = status & 0x0F;
        let data = |i: usize| bytes.get(i).map(|b| b & 0x7F);

        match status & 0xF0 {
            0x90 => {
                let key = data(1)?;
                let velocity = data(2)?;
                if velocity == 0 {
                    Some(MidiEvent::NoteOff {
                        channel,
                        key,
                        velocity: 0,
                    })
                } else {
                    Some(MidiEvent::NoteOn {
                        channel,
                        key,
                        velocity,
                    })
                }
            }
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: data(1)?,
                velocity: data(2)?,
            }),
            0xB0 => Some(MidiEvent::ControlChange {
                channel,
                controller: data(1)?,
                value: data(2)?,
            }),
            0xC0 => Some(MidiEvent::ProgramChange {
                channel,
                program: data(1)?,
            }),
            0xE0 => {
                let lsb = data(1)? as i16;
                let msb = data(2)? as i16;
                Some(MidiEvent::PitchBend {
                    channel,
                    value: ((msb << 7) | lsb) - 8192,
                })
            }
            _ => None,
        }
    }
}
