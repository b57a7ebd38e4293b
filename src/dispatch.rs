use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::context::PerformanceContext;
use crate::midi::{MidiMessage, MidiSink};
use crate::piano::Piano;
use crate::select::{SelectStep, SelectionBuffer};

/// Which input grammar is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Note keys play, control chords adjust the session.
    Normal,
    /// Instrument prompt owns all input until Enter.
    InstrumentSelect(SelectionBuffer),
    /// The submitted number was out of range; any key press dismisses.
    InvalidInstrument { entered: u32 },
}

/// What the caller should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Redraw,
    Unchanged,
    Quit,
}

/// Control chords available in [`Mode::Normal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chord {
    SelectInstrument,
    OctaveUp,
    OctaveDown,
    ChannelUp,
    ChannelDown,
    Quit,
}

impl Chord {
    fn from_key(key: &KeyEvent) -> Option<Self> {
        if !key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        let KeyCode::Char(ch) = key.code else {
            return None;
        };
        match ch.to_ascii_lowercase() {
            'i' => Some(Chord::SelectInstrument),
            'k' => Some(Chord::OctaveUp),
            'j' => Some(Chord::OctaveDown),
            'l' => Some(Chord::ChannelUp),
            'h' => Some(Chord::ChannelDown),
            'q' | 'c' => Some(Chord::Quit),
            _ => None,
        }
    }
}

/// Turns terminal events into note messages and session changes.
pub struct Dispatcher {
    piano: Piano,
    context: PerformanceContext,
    mode: Mode,
}

impl Dispatcher {
    pub fn new(piano: Piano, context: PerformanceContext) -> Self {
        Dispatcher {
            piano,
            context,
            mode: Mode::Normal,
        }
    }

    pub fn piano(&self) -> &Piano {
        &self.piano
    }

    pub fn context(&self) -> &PerformanceContext {
        &self.context
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Device write failures are logged and the session carries on.
    pub fn handle(&mut self, event: &Event, sink: &mut dyn MidiSink) -> Outcome {
        let key = match event {
            // Geometry is recomputed on every draw.
            Event::Resize(..) => return Outcome::Redraw,
            Event::Key(key) => key,
            _ => return Outcome::Unchanged,
        };

        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => self.handle_normal(key, sink),
            Mode::InstrumentSelect(buffer) => self.handle_select(buffer, key, sink),
            Mode::InvalidInstrument { entered } => {
                if key.kind == KeyEventKind::Press {
                    log::debug!("Dismissed invalid instrument {entered}");
                    Outcome::Redraw
                } else {
                    self.mode = Mode::InvalidInstrument { entered };
                    Outcome::Unchanged
                }
            }
        }
    }

    /// Release every held key. Returns how many note-offs the device
    /// rejected.
    pub fn all_notes_off(&mut self, sink: &mut dyn MidiSink) -> usize {
        self.piano
            .all_notes_off()
            .into_iter()
            .filter(|msg| !send(sink, *msg))
            .count()
    }

    fn handle_normal(&mut self, key: &KeyEvent, sink: &mut dyn MidiSink) -> Outcome {
        match key.kind {
            // Repeats behave like presses; the tracker absorbs them for note keys.
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if let Some(chord) = Chord::from_key(key) {
                    return self.run_chord(chord, sink);
                }
                if let Some(id) = self.piano.keymap().lookup(key.code) {
                    if let Some(msg) = self.piano.note_on(id, &self.context) {
                        if !send(sink, msg) {
                            // Never sounded, so a later release must not send a note-off.
                            self.piano.cancel(id);
                        }
                    }
                }
            }
            KeyEventKind::Release => {
                if let Some(id) = self.piano.keymap().lookup(key.code) {
                    if let Some(msg) = self.piano.note_off(id) {
                        send(sink, msg);
                    }
                }
            }
        }
        Outcome::Redraw
    }

    fn run_chord(&mut self, chord: Chord, sink: &mut dyn MidiSink) -> Outcome {
        let changed = match chord {
            Chord::SelectInstrument => {
                // Nothing may keep sounding while the prompt owns the keyboard.
                self.all_notes_off(sink);
                self.mode = Mode::InstrumentSelect(SelectionBuffer::new());
                log::debug!("Entering instrument selection");
                true
            }
            Chord::OctaveUp => self.context.shift_octave_up(),
            Chord::OctaveDown => self.context.shift_octave_down(),
            Chord::ChannelUp => self.context.shift_channel_up(),
            Chord::ChannelDown => self.context.shift_channel_down(),
            Chord::Quit => return Outcome::Quit,
        };
        if changed {
            Outcome::Redraw
        } else {
            Outcome::Unchanged
        }
    }

    fn handle_select(
        &mut self,
        mut buffer: SelectionBuffer,
        key: &KeyEvent,
        sink: &mut dyn MidiSink,
    ) -> Outcome {
        match buffer.handle_key(key) {
            SelectStep::Ignored => {
                self.mode = Mode::InstrumentSelect(buffer);
                Outcome::Unchanged
            }
            SelectStep::Edited => {
                self.mode = Mode::InstrumentSelect(buffer);
                Outcome::Redraw
            }
            SelectStep::Submit(value) => {
                let previous = self.context.instrument();
                match self.context.set_instrument(value) {
                    Some(msg) => {
                        if !send(sink, msg) {
                            // The device still plays the old program.
                            self.context.set_instrument(u32::from(previous));
                        }
                    }
                    None => {
                        log::warn!("Instrument {value} out of range");
                        self.mode = Mode::InvalidInstrument { entered: value };
                    }
                }
                Outcome::Redraw
            }
        }
    }
}

fn send(sink: &mut dyn MidiSink, msg: MidiMessage) -> bool {
    match sink.send(msg) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Dropped {msg}: {e:#}");
            false
        }
    }
}
