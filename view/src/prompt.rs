use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

/// A one-line input prompt such as `> 42█`.
///
/// Input is append-only from the widget's point of view, so the cursor is
/// always drawn after the last character.
pub struct Prompt<'a> {
    prefix: &'a str,
    value: &'a str,
    style: Style,
    cursor_style: Style,
}

impl<'a> Prompt<'a> {
    pub fn new(prefix: &'a str, value: &'a str) -> Self {
        Self {
            prefix,
            value,
            style: Style::default(),
            cursor_style: Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        }
    }
}

impl Widget for Prompt<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let y = area.y;
        let mut x = area.x;

        for ch in self.prefix.chars().chain(self.value.chars()) {
            if x >= area.right() {
                return;
            }
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(ch);
                cell.set_style(self.style);
            }
            x += 1;
        }

        if x < area.right()
            && let Some(cell) = buf.cell_mut((x, y))
        {
            cell.set_char(' ');
            cell.set_style(self.cursor_style);
        }
    }
}
