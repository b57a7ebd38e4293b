use crate::midi::MidiMessage;

pub const OCTAVE_MIN: i8 = -1;
pub const OCTAVE_MAX: i8 = 9;
/// Channel travels in the 4-bit low nibble of the status byte.
pub const CHANNEL_MAX: u8 = 15;
pub const INSTRUMENT_MIN: u8 = 0;
pub const INSTRUMENT_MAX: u8 = 127;

/// Session parameters the user adjusts while playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceContext {
    octave: i8,
    channel: u8,
    instrument: u8,
}

impl PerformanceContext {
    pub fn new(octave: i8, channel: u8, instrument: u8) -> anyhow::Result<Self> {
        if !(OCTAVE_MIN..=OCTAVE_MAX).contains(&octave) {
            anyhow::bail!("Octave {octave} out of range ({OCTAVE_MIN}..={OCTAVE_MAX})");
        }
        if channel > CHANNEL_MAX {
            anyhow::bail!("Channel {channel} out of range (0..={CHANNEL_MAX})");
        }
        if instrument > INSTRUMENT_MAX {
            anyhow::bail!("Instrument {instrument} out of range ({INSTRUMENT_MIN}..={INSTRUMENT_MAX})");
        }
        Ok(PerformanceContext {
            octave,
            channel,
            instrument,
        })
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn instrument(&self) -> u8 {
        self.instrument
    }

    /// Returns false (and changes nothing) at the upper bound.
    pub fn shift_octave_up(&mut self) -> bool {
        if self.octave < OCTAVE_MAX {
            self.octave += 1;
            log::info!("Octave up → {}", self.octave);
            true
        } else {
            false
        }
    }

    pub fn shift_octave_down(&mut self) -> bool {
        if self.octave > OCTAVE_MIN {
            self.octave -= 1;
            log::info!("Octave down → {}", self.octave);
            true
        } else {
            false
        }
    }

    pub fn shift_channel_up(&mut self) -> bool {
        if self.channel < CHANNEL_MAX {
            self.channel += 1;
            log::info!("Channel up → {}", self.channel);
            true
        } else {
            false
        }
    }

    pub fn shift_channel_down(&mut self) -> bool {
        if self.channel > 0 {
            self.channel -= 1;
            log::info!("Channel down → {}", self.channel);
            true
        } else {
            false
        }
    }

    /// Select a new instrument and return the program change announcing it.
    /// Out-of-range values leave the instrument untouched and return `None`.
    pub fn set_instrument(&mut self, program: u32) -> Option<MidiMessage> {
        let program = u8::try_from(program)
            .ok()
            .filter(|p| (INSTRUMENT_MIN..=INSTRUMENT_MAX).contains(p))?;
        self.instrument = program;
        log::info!("Instrument → {program} ({})", crate::catalog::name(program));
        Some(self.program_change())
    }

    /// Program change for the current instrument on the current channel.
    pub fn program_change(&self) -> MidiMessage {
        MidiMessage::ProgramChange {
            channel: self.channel,
            program: self.instrument,
        }
    }

    /// Absolute note for a key's relative note at the current octave, or
    /// `None` when it falls outside 0..=127.
    pub fn note_number(&self, base: u8) -> Option<u8> {
        let note = base as i16 + 12 * (self.octave as i16 + 1);
        u8::try_from(note).ok().filter(|n| *n <= 127)
    }
}
