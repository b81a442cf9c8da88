use std::collections::BTreeSet;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use super::Colors;
use crate::view::{Cell, GridCell, RenderFrame, SelectionKey};

/// Paints a [`RenderFrame`] as address column, hex pane and text pane
pub struct HexView<'a> {
    frame: &'a RenderFrame,
    /// Keys currently carrying the selection accent
    highlighted: Option<&'a BTreeSet<SelectionKey>>,
    /// Focused cell in the combined grid
    focus: Option<GridCell>,
}

impl<'a> HexView<'a> {
    pub fn new(frame: &'a RenderFrame) -> Self {
        Self {
            frame,
            highlighted: None,
            focus: None,
        }
    }

    pub fn highlighted(mut self, keys: &'a BTreeSet<SelectionKey>) -> Self {
        self.highlighted = Some(keys);
        self
    }

    pub fn focus(mut self, focus: GridCell) -> Self {
        self.focus = Some(focus);
        self
    }

    fn is_highlighted(&self, row: usize, col: usize) -> bool {
        self.highlighted
            .is_some_and(|keys| keys.contains(&SelectionKey { row, col }))
    }

    fn cell_style(&self, cell: &Cell, row: usize, grid_col: usize, pane_col: usize) -> Style {
        let accent = if cell.group == 0 {
            Colors::GROUP_EVEN
        } else {
            Colors::GROUP_ODD
        };
        let style = Style::default().fg(accent);

        if self.focus == Some(GridCell::new(row, grid_col)) {
            style.bg(Colors::FOCUS_BG).fg(Colors::FOCUS_FG)
        } else if self.is_highlighted(row, pane_col) {
            style.bg(Colors::SELECTION_BG).fg(Colors::SELECTION_FG)
        } else {
            style
        }
    }

    fn render_row(&self, row: usize, area: Rect, buf: &mut Buffer) {
        let columns = self.frame.columns();
        let y = area.y;
        let mut x = area.x;

        let label = &self.frame.row_labels()[row];
        buf.set_string(x, y, label, Style::default().fg(Colors::ADDR));
        x += label.len() as u16 + 2;

        let cells = self.frame.row(row);
        let text_x = x + (columns as u16) * 3 + 1;

        for (col, cell) in cells.iter().enumerate() {
            if !cell.is_populated() {
                continue;
            }
            let hex_x = x + (col as u16) * 3;
            buf.set_string(hex_x, y, &cell.hex_text, self.cell_style(cell, row, col, col));
            buf.set_string(
                text_x + col as u16,
                y,
                &cell.char_text,
                self.cell_style(cell, row, col + columns, col),
            );
        }
    }
}

impl Widget for HexView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label_width = self
            .frame
            .row_labels()
            .first()
            .map_or(8, |label| label.len());
        let header = format!(
            "{:<width$}  {}  {}",
            "Offset",
            self.frame.column_labels()[..self.frame.columns()]
                .iter()
                .map(|label| format!("{:>2}", label))
                .collect::<Vec<_>>()
                .join(" "),
            "Text",
            width = label_width
        );
        buf.set_string(
            area.x,
            area.y,
            &header,
            Style::default()
                .fg(Colors::HEADER)
                .add_modifier(Modifier::BOLD),
        );

        let visible_rows = (area.height as usize)
            .saturating_sub(1)
            .min(self.frame.rows());
        for row in 0..visible_rows {
            let row_area = Rect {
                x: area.x,
                y: area.y + 1 + row as u16,
                width: area.width,
                height: 1,
            };
            self.render_row(row, row_area, buf);
        }
    }
}

/// Plain-text rendering of a frame, one line per row
pub fn frame_lines(frame: &RenderFrame) -> Vec<String> {
    (0..frame.rows())
        .map(|row| {
            let cells = frame.row(row);
            let hex = cells
                .iter()
                .map(|c| if c.is_populated() { c.hex_text.as_str() } else { "  " })
                .collect::<Vec<_>>()
                .join(" ");
            let text: String = cells
                .iter()
                .map(|c| if c.is_populated() { c.char_text.as_str() } else { " " })
                .collect();
            format!("{}  {}  {}", frame.row_labels()[row], hex, text.trim_end())
        })
        .collect()
}
