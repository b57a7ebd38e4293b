use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

/// Longest number the prompt accepts. Nine decimal digits always fit a u32.
pub const MAX_DIGITS: usize = 9;

/// Digits typed at the instrument prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionBuffer {
    digits: String,
}

/// What a key press did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectStep {
    /// Nothing changed.
    Ignored,
    /// Buffer changed, prompt needs redrawing.
    Edited,
    /// Enter pressed with this value.
    Submit(u32),
}

impl SelectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Append a digit. Returns false when full or not a digit.
    pub fn push(&mut self, ch: char) -> bool {
        if !ch.is_ascii_digit() || self.digits.len() >= MAX_DIGITS {
            return false;
        }
        self.digits.push(ch);
        true
    }

    /// Remove the last digit. Returns false when already empty.
    pub fn backspace(&mut self) -> bool {
        self.digits.pop().is_some()
    }

    /// Numeric value; an empty buffer reads as 0.
    pub fn value(&self) -> u32 {
        self.digits.parse().unwrap_or(0)
    }

    /// Interpret one key event under the prompt's grammar.
    pub fn handle_key(&mut self, key: &KeyEvent) -> SelectStep {
        if key.kind == KeyEventKind::Release {
            return SelectStep::Ignored;
        }

        let changed = match key.code {
            KeyCode::Enter => return SelectStep::Submit(self.value()),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(ch) => self.push(ch),
            _ => false,
        };

        if changed {
            SelectStep::Edited
        } else {
            SelectStep::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    #[test]
    fn digits_append() {
        let mut buf = SelectionBuffer::new();
        assert_eq!(buf.handle_key(&press(KeyCode::Char('4'))), SelectStep::Edited);
        assert_eq!(buf.handle_key(&press(KeyCode::Char('2'))), SelectStep::Edited);
        assert_eq!(buf.as_str(), "42");
        assert_eq!(buf.handle_key(&press(KeyCode::Enter)), SelectStep::Submit(42));
    }

    #[test]
    fn full_buffer_ignores_digits() {
        let mut buf = SelectionBuffer::new();
        for _ in 0..MAX_DIGITS {
            assert!(buf.push('9'));
        }
        assert_eq!(buf.handle_key(&press(KeyCode::Char('9'))), SelectStep::Ignored);
        assert_eq!(buf.as_str().len(), MAX_DIGITS);
        assert_eq!(buf.value(), 999_999_999);
    }

    #[test]
    fn backspace_removes_last_digit() {
        let mut buf = SelectionBuffer::new();
        buf.push('1');
        buf.push('2');
        assert_eq!(buf.handle_key(&press(KeyCode::Backspace)), SelectStep::Edited);
        assert_eq!(buf.as_str(), "1");
    }

    #[test]
    fn backspace_on_empty_is_noop() {
        let mut buf = SelectionBuffer::new();
        assert_eq!(buf.handle_key(&press(KeyCode::Backspace)), SelectStep::Ignored);
        assert_eq!(buf.handle_key(&press(KeyCode::Backspace)), SelectStep::Ignored);
        assert!(buf.is_empty());
    }

    #[test]
    fn other_keys_ignored() {
        let mut buf = SelectionBuffer::new();
        buf.push('7');
        for code in [KeyCode::Char('z'), KeyCode::Esc, KeyCode::Left, KeyCode::Tab] {
            assert_eq!(buf.handle_key(&press(code)), SelectStep::Ignored);
        }
        assert_eq!(buf.as_str(), "7");
    }

    #[test]
    fn releases_ignored() {
        let mut buf = SelectionBuffer::new();
        let release =
            KeyEvent::new_with_kind(KeyCode::Char('5'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(buf.handle_key(&release), SelectStep::Ignored);
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_submit_is_zero() {
        let mut buf = SelectionBuffer::new();
        assert_eq!(buf.handle_key(&press(KeyCode::Enter)), SelectStep::Submit(0));
    }
}
