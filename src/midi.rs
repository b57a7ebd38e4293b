use std::fmt;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const PROGRAM_CHANGE: u8 = 0xC0;

/// An outbound channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    ProgramChange { channel: u8, program: u8 },
}

/// Wire bytes of one message. Standard channel messages are at most 3 bytes,
/// so this stays on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    buf: [u8; 3],
    len: usize,
}

impl AsRef<[u8]> for Encoded {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl MidiMessage {
    /// Status nibble in the high bits, channel in the low nibble. Data bytes
    /// are masked to 7 bits; range checking is the caller's job.
    pub fn encode(&self) -> Encoded {
        match *self {
            MidiMessage::NoteOn { channel, note, velocity } => Encoded {
                buf: [NOTE_ON | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
                len: 3,
            },
            MidiMessage::NoteOff { channel, note, velocity } => Encoded {
                buf: [NOTE_OFF | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
                len: 3,
            },
            MidiMessage::ProgramChange { channel, program } => Encoded {
                buf: [PROGRAM_CHANGE | (channel & 0x0F), program & 0x7F, 0],
                len: 2,
            },
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOn { channel, note, velocity } => {
                write!(f, "NoteOn  ch={channel} {} vel={velocity}", note_name(note))
            }
            MidiMessage::NoteOff { channel, note, velocity } => {
                write!(f, "NoteOff ch={channel} {} vel={velocity}", note_name(note))
            }
            MidiMessage::ProgramChange { channel, program } => {
                write!(f, "PgmChg  ch={channel} program={program}")
            }
        }
    }
}

/// Destination for outbound messages.
pub trait MidiSink {
    fn send(&mut self, msg: MidiMessage) -> anyhow::Result<()>;
}

pub fn note_name(note: u8) -> String {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    let octave = (note / 12) as i8 - 1;
    let name = NAMES[(note % 12) as usize];
    format!("{name}{octave}")
}

/// Sink that records everything it is given.
#[cfg(test)]
#[derive(Default)]
pub struct Recorder {
    pub sent: Vec<MidiMessage>,
}

#[cfg(test)]
impl MidiSink for Recorder {
    fn send(&mut self, msg: MidiMessage) -> anyhow::Result<()> {
        self.sent.push(msg);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_bytes() {
        let msg = MidiMessage::NoteOn { channel: 1, note: 60, velocity: 100 };
        assert_eq!(msg.encode().as_ref(), &[0x91, 0x3C, 0x64]);
    }

    #[test]
    fn note_off_bytes() {
        let msg = MidiMessage::NoteOff { channel: 0, note: 64, velocity: 100 };
        assert_eq!(msg.encode().as_ref(), &[0x80, 64, 100]);
    }

    #[test]
    fn program_change_is_two_bytes() {
        let msg = MidiMessage::ProgramChange { channel: 9, program: 42 };
        assert_eq!(msg.encode().as_ref(), &[0xC9, 42]);
    }

    #[test]
    fn encoding_is_stable() {
        let msg = MidiMessage::NoteOn { channel: 15, note: 127, velocity: 1 };
        let first = msg.encode();
        for _ in 0..10 {
            assert_eq!(msg.encode(), first);
        }
    }

    #[test]
    fn channel_confined_to_low_nibble() {
        let msg = MidiMessage::ProgramChange { channel: 0x1F, program: 0 };
        assert_eq!(msg.encode().as_ref()[0], 0xCF);
    }

    #[test]
    fn note_names() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(127), "G9");
    }
}
