use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

/// One drawable piano key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PianoKey {
    /// Keyboard symbol printed on the key.
    pub label: char,
    pub pressed: bool,
}

/// A piano keyboard drawn with block cells.
///
/// Naturals are laid out left to right and drawn first; each sharp sits on
/// the boundary to the right of the natural it follows and covers the top
/// two thirds of the keyboard.
pub struct Keyboard<'a> {
    naturals: &'a [PianoKey],
    sharps: &'a [(usize, PianoKey)],
    key_width: u16,
    natural_style: Style,
    natural_pressed_style: Style,
    sharp_style: Style,
    sharp_pressed_style: Style,
    border_style: Style,
}

impl<'a> Keyboard<'a> {
    /// `sharps` pairs each sharp with the index of the natural to its left.
    pub fn new(naturals: &'a [PianoKey], sharps: &'a [(usize, PianoKey)]) -> Self {
        Self {
            naturals,
            sharps,
            key_width: 6,
            natural_style: Style::default().fg(Color::Black).bg(Color::White),
            natural_pressed_style: Style::default().fg(Color::Black).bg(Color::LightCyan),
            sharp_style: Style::default().fg(Color::White).bg(Color::Black),
            sharp_pressed_style: Style::default().fg(Color::White).bg(Color::Blue),
            border_style: Style::default().fg(Color::DarkGray).bg(Color::White),
        }
    }

    /// Width of one natural key when rendered into `area`.
    pub fn fitted_key_width(&self, area: Rect) -> u16 {
        if self.naturals.is_empty() {
            return self.key_width;
        }
        let fit = area.width / self.naturals.len() as u16;
        self.key_width.min(fit).max(2)
    }
}

fn fill(buf: &mut Buffer, rect: Rect, clip: Rect, style: Style) {
    let rect = rect.intersection(clip);
    for y in rect.top()..rect.bottom() {
        for x in rect.left()..rect.right() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(' ');
                cell.set_style(style);
            }
        }
    }
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, clip: Rect, ch: char, style: Style) {
    if x < clip.left() || x >= clip.right() || y < clip.top() || y >= clip.bottom() {
        return;
    }
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

impl Widget for Keyboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 || area.width == 0 {
            return;
        }

        let w = self.fitted_key_width(area);

        // White keys go first so black keys stay on top.
        for (i, key) in self.naturals.iter().enumerate() {
            let x = area.x + i as u16 * w;
            if x >= area.right() {
                break;
            }
            let style = if key.pressed {
                self.natural_pressed_style
            } else {
                self.natural_style
            };
            fill(buf, Rect::new(x, area.y, w - 1, area.height), area, style);
            for y in area.top()..area.bottom() {
                put_char(buf, x + w - 1, y, area, '│', self.border_style);
            }
            put_char(buf, x + (w - 1) / 2, area.bottom() - 1, area, key.label, style);
        }

        let sharp_w = (w * 2 / 3).max(1);
        let sharp_h = (area.height * 2 / 3).max(1);
        for &(after, key) in self.sharps {
            let boundary = area.x + (after as u16 + 1) * w - 1;
            let x = boundary.saturating_sub(sharp_w / 2);
            if x >= area.right() {
                continue;
            }
            let style = if key.pressed {
                self.sharp_pressed_style
            } else {
                self.sharp_style
            };
            fill(buf, Rect::new(x, area.y, sharp_w, sharp_h), area, style);
            put_char(buf, x + (sharp_w - 1) / 2, area.y + sharp_h - 1, area, key.label, style);
        }
    }
}
