use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

/// A single row of `label: value` fields.
///
/// Labels are dimmed, values highlighted. An optional right-aligned hint
/// (e.g. key bindings) is drawn when it fits.
pub struct StatusBar<'a> {
    fields: &'a [(&'a str, String)],
    hint: Option<&'a str>,
    label_style: Style,
    value_style: Style,
    hint_style: Style,
    separator: &'a str,
}

impl<'a> StatusBar<'a> {
    pub fn new(fields: &'a [(&'a str, String)]) -> Self {
        Self {
            fields,
            hint: None,
            label_style: Style::default().fg(Color::DarkGray),
            value_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            hint_style: Style::default().fg(Color::DarkGray),
            separator: "   ",
        }
    }

    pub fn hint(mut self, text: &'a str) -> Self {
        self.hint = Some(text);
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let y = area.y;
        let mut x = area.x;
        let mut put = |x: &mut u16, text: &str, style: Style| {
            for ch in text.chars() {
                if *x >= area.right() {
                    break;
                }
                if let Some(cell) = buf.cell_mut((*x, y)) {
                    cell.set_char(ch);
                    cell.set_style(style);
                }
                *x += 1;
            }
        };

        for (i, (label, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                put(&mut x, self.separator, self.label_style);
            }
            put(&mut x, *label, self.label_style);
            put(&mut x, ": ", self.label_style);
            put(&mut x, value.as_str(), self.value_style);
        }

        // Right-aligned hint, only if it doesn't overlap the fields.
        if let Some(text) = self.hint {
            let len = text.chars().count() as u16;
            if x + len < area.right() {
                let mut hx = area.right() - len;
                put(&mut hx, text, self.hint_style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, width: u16) -> String {
        (0..width).map(|x| buf[(x, 0)].symbol()).collect()
    }

    #[test]
    fn renders_fields_and_hint() {
        let fields = [("octave", "4".to_string()), ("channel", "0".to_string())];
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new(&fields).hint("^Q quit").render(area, &mut buf);

        let text = row(&buf, 40);
        assert!(text.starts_with("octave: 4   channel: 0"));
        assert!(text.ends_with("^Q quit"));
        assert_eq!(buf[(0, 0)].fg, Color::DarkGray);
        assert_eq!(buf[(8, 0)].fg, Color::White);
    }

    #[test]
    fn hint_dropped_when_it_would_overlap() {
        let fields = [("octave", "4".to_string()), ("channel", "0".to_string())];
        let area = Rect::new(0, 0, 26, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new(&fields).hint("^Q quit").render(area, &mut buf);

        assert_eq!(row(&buf, 26).trim_end(), "octave: 4   channel: 0");
    }
}
