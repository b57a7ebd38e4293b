use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

/// Items flowed top-to-bottom into as many columns as the area needs.
///
/// Column width is the longest item plus padding. Items that don't fit
/// horizontally are not drawn.
pub struct InstrumentGrid<'a> {
    items: &'a [String],
    highlight: Option<usize>,
    style: Style,
    highlight_style: Style,
    padding: u16,
}

impl<'a> InstrumentGrid<'a> {
    pub fn new(items: &'a [String]) -> Self {
        Self {
            items,
            highlight: None,
            style: Style::default(),
            highlight_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            padding: 2,
        }
    }

    /// Highlight the item at `index` (ignored if out of bounds).
    pub fn highlight(mut self, index: Option<usize>) -> Self {
        self.highlight = index;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn column_width(&self) -> u16 {
        let longest = self.items.iter().map(|s| s.chars().count()).max().unwrap_or(0);
        longest as u16 + self.padding
    }

    /// Cell position of item `index` when rendered into `area`.
    pub fn position(&self, index: usize, area: Rect) -> Option<(u16, u16)> {
        if area.height == 0 || index >= self.items.len() {
            return None;
        }
        let rows = area.height as usize;
        let col = (index / rows) as u16;
        let row = (index % rows) as u16;
        let x = area.x.checked_add(col.checked_mul(self.column_width())?)?;
        if x >= area.right() {
            return None;
        }
        Some((x, area.y + row))
    }
}

impl Widget for InstrumentGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let col_width = self.column_width();
        for (i, item) in self.items.iter().enumerate() {
            let Some((x0, y)) = self.position(i, area) else {
                continue;
            };
            let style = if self.highlight == Some(i) {
                self.highlight_style
            } else {
                self.style
            };
            let limit = area.right().min(x0.saturating_add(col_width));
            let mut x = x0;
            for ch in item.chars() {
                if x >= limit {
                    break;
                }
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(ch);
                    cell.set_style(style);
                }
                x += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flows_into_columns() {
        let items: Vec<String> = (0..10).map(|i| format!("{i}: x")).collect();
        let grid = InstrumentGrid::new(&items);
        let area = Rect::new(0, 0, 40, 4);

        assert_eq!(grid.position(0, area), Some((0, 0)));
        assert_eq!(grid.position(3, area), Some((0, 3)));
        assert_eq!(grid.position(4, area), Some((6, 0)));
        assert_eq!(grid.position(9, area), Some((12, 1)));
        assert_eq!(grid.position(10, area), None);
    }

    #[test]
    fn overflowing_columns_are_dropped() {
        let items: Vec<String> = (0..10).map(|i| format!("{i}: x")).collect();
        let grid = InstrumentGrid::new(&items);
        assert_eq!(grid.position(9, Rect::new(0, 0, 10, 4)), None);
    }
}
