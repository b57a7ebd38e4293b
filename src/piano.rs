use crate::context::PerformanceContext;
use crate::keymap::{BindingId, KeyMap};
use crate::midi::{MidiMessage, note_name};

/// Per-key status. A pressed key remembers what it sounded so the matching
/// note-off goes out even if octave or channel changed in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Released,
    Pressed { channel: u8, note: u8 },
}

/// Tracks which keys of the layout are currently sounding.
pub struct Piano {
    keymap: KeyMap,
    status: Vec<KeyStatus>,
    velocity: u8,
}

impl Piano {
    pub fn new(keymap: KeyMap, velocity: u8) -> Self {
        let status = vec![KeyStatus::Released; keymap.len()];
        Piano {
            keymap,
            status,
            velocity,
        }
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn status(&self, id: BindingId) -> KeyStatus {
        self.status.get(id).copied().unwrap_or(KeyStatus::Released)
    }

    pub fn is_pressed(&self, id: BindingId) -> bool {
        matches!(self.status(id), KeyStatus::Pressed { .. })
    }

    pub fn held_count(&self) -> usize {
        self.status
            .iter()
            .filter(|s| matches!(s, KeyStatus::Pressed { .. }))
            .count()
    }

    /// Released → pressed. Returns the note-on to send, or `None` when the
    /// key is already down (key repeat) or its note is out of range.
    pub fn note_on(&mut self, id: BindingId, ctx: &PerformanceContext) -> Option<MidiMessage> {
        let binding = self.keymap.get(id)?;
        if self.is_pressed(id) {
            return None;
        }

        let Some(note) = ctx.note_number(binding.note) else {
            log::debug!(
                "Piano: key '{}' out of range at octave {}",
                binding.symbol,
                ctx.octave()
            );
            return None;
        };

        let channel = ctx.channel();
        self.status[id] = KeyStatus::Pressed { channel, note };
        log::info!("Piano: NoteOn note={note} ({})", note_name(note));
        Some(MidiMessage::NoteOn {
            channel,
            note,
            velocity: self.velocity,
        })
    }

    /// Pressed → released. Returns the note-off to send, or `None` when the
    /// key was not down.
    pub fn note_off(&mut self, id: BindingId) -> Option<MidiMessage> {
        let KeyStatus::Pressed { channel, note } = self.status(id) else {
            return None;
        };
        self.status[id] = KeyStatus::Released;
        log::info!("Piano: NoteOff note={note} ({})", note_name(note));
        Some(MidiMessage::NoteOff {
            channel,
            note,
            velocity: self.velocity,
        })
    }

    /// Forget a press whose note-on never reached the device.
    pub fn cancel(&mut self, id: BindingId) {
        if let Some(status) = self.status.get_mut(id) {
            *status = KeyStatus::Released;
        }
    }

    /// Release every held key, returning the note-offs to send.
    pub fn all_notes_off(&mut self) -> Vec<MidiMessage> {
        (0..self.status.len())
            .filter_map(|id| self.note_off(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    fn setup() -> (Piano, PerformanceContext) {
        let piano = Piano::new(KeyMap::default(), 100);
        let ctx = PerformanceContext::new(4, 1, 0).unwrap();
        (piano, ctx)
    }

    fn id(piano: &Piano, ch: char) -> BindingId {
        piano.keymap().lookup(KeyCode::Char(ch)).unwrap()
    }

    #[test]
    fn press_then_release_sends_one_pair() {
        let (mut piano, ctx) = setup();
        let z = id(&piano, 'z');

        assert_eq!(
            piano.note_on(z, &ctx),
            Some(MidiMessage::NoteOn { channel: 1, note: 60, velocity: 100 })
        );
        assert!(piano.is_pressed(z));
        assert_eq!(
            piano.note_off(z),
            Some(MidiMessage::NoteOff { channel: 1, note: 60, velocity: 100 })
        );
        assert!(!piano.is_pressed(z));
    }

    #[test]
    fn repeated_press_is_ignored() {
        let (mut piano, ctx) = setup();
        let s = id(&piano, 's');

        assert!(piano.note_on(s, &ctx).is_some());
        for _ in 0..5 {
            assert_eq!(piano.note_on(s, &ctx), None);
        }
        assert!(piano.note_off(s).is_some());
        assert_eq!(piano.note_off(s), None);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let (mut piano, _) = setup();
        let x = id(&piano, 'x');
        assert_eq!(piano.note_off(x), None);
    }

    #[test]
    fn note_off_matches_sounding_note_after_context_change() {
        let (mut piano, mut ctx) = setup();
        let z = id(&piano, 'z');

        piano.note_on(z, &ctx);
        ctx.shift_octave_up();
        ctx.shift_channel_up();
        assert_eq!(
            piano.note_off(z),
            Some(MidiMessage::NoteOff { channel: 1, note: 60, velocity: 100 })
        );
    }

    #[test]
    fn out_of_range_key_stays_released() {
        let mut piano = Piano::new(KeyMap::default(), 100);
        let ctx = PerformanceContext::new(9, 0, 0).unwrap();
        let p = id(&piano, 'p');

        assert_eq!(piano.note_on(p, &ctx), None);
        assert!(!piano.is_pressed(p));
    }

    #[test]
    fn all_notes_off_releases_everything() {
        let (mut piano, ctx) = setup();
        for ch in ['z', 'x', 'q'] {
            let k = id(&piano, ch);
            piano.note_on(k, &ctx);
        }
        assert_eq!(piano.held_count(), 3);

        let offs = piano.all_notes_off();
        assert_eq!(offs.len(), 3);
        assert!(offs.iter().all(|m| matches!(m, MidiMessage::NoteOff { .. })));
        assert_eq!(piano.held_count(), 0);
        assert!(piano.all_notes_off().is_empty());
    }

    #[test]
    fn cancel_forgets_press_without_note_off() {
        let (mut piano, ctx) = setup();
        let z = id(&piano, 'z');

        piano.note_on(z, &ctx);
        piano.cancel(z);
        assert!(!piano.is_pressed(z));
        assert_eq!(piano.note_off(z), None);
        assert!(piano.note_on(z, &ctx).is_some());
    }
}
