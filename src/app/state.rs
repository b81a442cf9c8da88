use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Paragraph,
    Frame,
};
use tracing::{debug, warn};

use super::{format_offset, Action, InputState, KeyMod, Session};
use crate::ui::{Colors, HexView};
use crate::view::{GridCell, RenderFrame, SelectionKey};

/// Interactive viewer state on top of a [`Session`].
///
/// Selection and focus live in grid coordinates, so they stay put on screen
/// while the window scrolls underneath them.
pub struct App {
    session: Session,
    /// Frame for the current window; rebuilt after every navigation or write
    frame: RenderFrame,
    /// Focused cell in the combined grid
    focus: GridCell,
    /// Selected cells in the combined grid
    selection: Vec<GridCell>,
    /// Keys currently painted with the selection accent
    highlighted: BTreeSet<SelectionKey>,
    input_state: InputState,
    /// Offset under the focused cell
    status_offset: Option<usize>,
    status_message: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        let frame = session.build_frame();
        let mut app = Self {
            session,
            frame,
            focus: GridCell::new(0, 0),
            selection: Vec::new(),
            highlighted: BTreeSet::new(),
            input_state: InputState::Normal,
            status_offset: None,
            status_message: None,
            should_quit: false,
        };
        app.update_status_offset();
        app
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn frame(&self) -> &RenderFrame {
        &self.frame
    }

    pub fn focus(&self) -> GridCell {
        self.focus
    }

    pub fn highlighted(&self) -> &BTreeSet<SelectionKey> {
        &self.highlighted
    }

    pub fn status_offset(&self) -> Option<usize> {
        self.status_offset
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn refresh(&mut self) {
        self.frame = self.session.build_frame();
    }

    fn grid_columns(&self) -> usize {
        self.session.columns() * 2
    }

    /// Follow a change in terminal height
    pub fn set_visible_rows(&mut self, rows: usize) {
        let rows = rows.max(1);
        if rows == self.session.viewport().rows() {
            return;
        }
        self.session.resize(rows);
        self.focus.row = self.focus.row.min(rows - 1);
        self.refresh();
        self.update_status_offset();
        debug!(rows, "viewer resized");
    }

    fn update_status_offset(&mut self) {
        let delta = self
            .session
            .sync_selection(&self.selection, &self.selection, Some(self.focus));
        self.show_offset(delta.current_offset);
    }

    /// Placeholder cells past the end of data have no offset to show
    fn show_offset(&mut self, offset: Option<usize>) {
        self.status_offset = offset.filter(|&offset| offset < self.session.len());
    }

    fn scroll(&mut self, f: impl FnOnce(&mut Session) -> usize) {
        f(&mut self.session);
        self.refresh();
        self.update_status_offset();
    }

    fn move_focus(&mut self, drow: isize, dcol: isize) {
        let rows = self.session.viewport().rows();
        let last_col = self.grid_columns() - 1;

        if drow < 0 && self.focus.row == 0 {
            self.scroll(|s| s.jump_by_rows(1));
        } else if drow > 0 && self.focus.row + 1 >= rows {
            self.scroll(|s| s.jump_by_rows(-1));
        } else {
            self.focus.row = self.focus.row.saturating_add_signed(drow).min(rows - 1);
        }
        self.focus.col = self.focus.col.saturating_add_signed(dcol).min(last_col);
        self.update_status_offset();
    }

    fn set_selection(&mut self, new: Vec<GridCell>) {
        let delta = self
            .session
            .sync_selection(&self.selection, &new, Some(self.focus));
        for key in &delta.to_unhighlight {
            self.highlighted.remove(key);
        }
        self.highlighted.extend(delta.to_highlight.iter().copied());
        self.selection = new;
        self.show_offset(delta.current_offset);
    }

    fn is_selected(&self, cells: &[GridCell], cell: GridCell) -> bool {
        let sync = self.session.selection();
        let key = sync.canonical_key(cell);
        cells.iter().any(|&c| sync.canonical_key(c) == key)
    }

    /// Move the focus and add both the old and the new focused byte to the selection
    fn extend_selection(&mut self, drow: isize, dcol: isize) {
        let mut new = self.selection.clone();
        if !self.is_selected(&new, self.focus) {
            new.push(self.focus);
        }
        self.move_focus(drow, dcol);
        if !self.is_selected(&new, self.focus) {
            new.push(self.focus);
        }
        self.set_selection(new);
    }

    fn toggle_select(&mut self) {
        let sync = *self.session.selection();
        let key = sync.canonical_key(self.focus);
        let mut new = self.selection.clone();
        if self.highlighted.contains(&key) {
            new.retain(|&cell| sync.canonical_key(cell) != key);
        } else {
            new.push(self.focus);
        }
        self.set_selection(new);
    }

    fn input_hex(&mut self, digit: u8) {
        if !self.session.is_writable() {
            self.status_message = Some("Read-only".to_string());
            return;
        }
        let offset = self
            .session
            .selection()
            .focused_offset(self.focus, self.session.viewport().offset());
        if offset >= self.session.len() {
            self.input_state = InputState::Normal;
            return;
        }

        match self.input_state {
            InputState::Normal => {
                self.input_state = InputState::HexFirstDigit(digit);
            }
            InputState::HexFirstDigit(high) => {
                self.input_state = InputState::Normal;
                let value = (high << 4) | digit;
                match self.session.write_byte(offset, value) {
                    Ok(()) => {
                        self.refresh();
                        let columns = self.session.columns();
                        if (self.focus.col % columns) + 1 < columns {
                            self.move_focus(0, 1);
                        }
                    }
                    Err(e) => {
                        warn!(offset, error = %e, "write failed");
                        self.status_message = Some(format!("Write failed: {}", e));
                    }
                }
            }
        }
    }

    fn flush(&mut self) {
        self.status_message = Some(match self.session.flush() {
            Ok(()) => "Flushed".to_string(),
            Err(e) => format!("Flush failed: {}", e),
        });
    }

    /// Apply one action
    pub fn execute(&mut self, action: Action) {
        if !matches!(action, Action::InputHex(_)) {
            self.input_state = InputState::Normal;
        }
        if action != Action::None {
            self.status_message = None;
        }

        match action {
            Action::Quit => self.should_quit = true,

            Action::ScrollUp => self.scroll(|s| s.jump_by_rows(1)),
            Action::ScrollDown => self.scroll(|s| s.jump_by_rows(-1)),
            Action::PageUp => self.scroll(|s| s.jump_by_pages(1)),
            Action::PageDown => self.scroll(|s| s.jump_by_pages(-1)),
            Action::GotoBeginning => self.scroll(|s| s.jump_to(0)),
            Action::GotoEnd => self.scroll(|s| s.jump_to(usize::MAX)),

            Action::FocusUp => self.move_focus(-1, 0),
            Action::FocusDown => self.move_focus(1, 0),
            Action::FocusLeft => self.move_focus(0, -1),
            Action::FocusRight => self.move_focus(0, 1),
            Action::SelectUp => self.extend_selection(-1, 0),
            Action::SelectDown => self.extend_selection(1, 0),
            Action::SelectLeft => self.extend_selection(0, -1),
            Action::SelectRight => self.extend_selection(0, 1),
            Action::SwitchPane => {
                self.focus = self.session.selection().mirror(self.focus);
                self.update_status_offset();
            }

            Action::ToggleSelect => self.toggle_select(),
            Action::ClearSelection => self.set_selection(Vec::new()),

            Action::InputHex(digit) => self.input_hex(digit),
            Action::Flush => self.flush(),

            Action::CycleCodePage => {
                let next = self.session.code_page().next();
                self.session.set_code_page(next);
                self.refresh();
                self.status_message = Some(format!("Code page: {}", next));
            }

            Action::None => {}
        }
    }

    /// Wait briefly for one terminal event and handle it
    pub fn handle_event(&mut self) -> Result<()> {
        if !event::poll(Duration::from_millis(100))? {
            return Ok(());
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }
            let mods = KeyMod {
                ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
                shift: key.modifiers.contains(KeyModifiers::SHIFT),
                alt: key.modifiers.contains(KeyModifiers::ALT),
            };
            self.execute(Action::from_key(key.code, mods));
        }
        Ok(())
    }

    fn status_line(&self) -> String {
        let offset = self
            .status_offset
            .map_or_else(|| "-".to_string(), format_offset);
        let access = if self.session.is_writable() { "RW" } else { "RO" };
        let mut status = format!(
            " {} | Offset: {} | {} | {}",
            self.session.source_label(),
            offset,
            self.session.code_page(),
            access
        );
        if let InputState::HexFirstDigit(high) = self.input_state {
            status.push_str(&format!(" | {:X}_", high));
        }
        if let Some(ref msg) = self.status_message {
            status.push_str(" | ");
            status.push_str(msg);
        }
        status
    }

    /// Draw the grid and the status bar
    pub fn draw(&mut self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(2),    // header + grid
                Constraint::Length(1), // status
            ])
            .split(frame.area());

        // one line of the grid area is the column header
        self.set_visible_rows((layout[0].height as usize).saturating_sub(1));

        let hex_view = HexView::new(&self.frame)
            .highlighted(&self.highlighted)
            .focus(self.focus);
        frame.render_widget(hex_view, layout[0]);

        let status = Paragraph::new(self.status_line())
            .style(Style::default().bg(Colors::STATUS_BG).fg(Colors::STATUS_FG));
        frame.render_widget(status, layout[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(data: Vec<u8>, writable: bool) -> App {
        let mut session = Session::new(16, 4);
        session.open_bytes(data, writable);
        App::new(session)
    }

    #[test]
    fn selecting_in_either_pane_highlights_one_key() {
        let mut app = app(vec![0; 256], false);
        app.execute(Action::FocusRight);
        app.execute(Action::ToggleSelect);
        assert_eq!(app.highlighted().len(), 1);

        // the same byte seen from the text pane toggles it off again
        app.execute(Action::SwitchPane);
        assert_eq!(app.focus(), GridCell::new(0, 17));
        app.execute(Action::ToggleSelect);
        assert!(app.highlighted().is_empty());
    }

    #[test]
    fn focus_above_first_row_scrolls_up() {
        let mut app = app(vec![0; 1024], false);
        app.execute(Action::PageDown);
        assert_eq!(app.session().viewport().offset(), 64);
        app.execute(Action::FocusUp);
        assert_eq!(app.session().viewport().offset(), 48);
        assert_eq!(app.status_offset(), Some(48));
    }

    #[test]
    fn hex_input_writes_focused_byte() {
        let mut app = app(vec![0; 32], true);
        app.execute(Action::FocusRight);
        app.execute(Action::InputHex(0xB));
        app.execute(Action::InputHex(0x7));
        assert_eq!(app.session().source().unwrap().get(1), Some(0xB7));
        assert_eq!(app.frame().cell(0, 1).unwrap().hex_text, "B7");
        assert_eq!(app.focus(), GridCell::new(0, 2));
    }

    #[test]
    fn hex_input_on_read_only_source_is_refused() {
        let mut app = app(vec![0; 32], false);
        app.execute(Action::InputHex(1));
        app.execute(Action::InputHex(2));
        assert_eq!(app.session().source().unwrap().get(0), Some(0));
    }

    #[test]
    fn goto_end_shows_last_page() {
        let mut app = app(vec![0; 1000], false);
        app.execute(Action::GotoEnd);
        assert_eq!(app.session().viewport().offset(), 1000 - 64);
        app.execute(Action::ScrollDown);
        assert_eq!(app.session().viewport().offset(), 1000 - 64);
    }

    #[test]
    fn shift_arrows_extend_selection() {
        let mut app = app(vec![0; 256], false);
        app.execute(Action::SelectRight);
        app.execute(Action::SelectRight);
        app.execute(Action::SelectDown);
        let keys: Vec<_> = app.highlighted().iter().map(|k| (k.row, k.col)).collect();
        assert_eq!(keys, vec![(0, 0), (0, 1), (0, 2), (1, 2)]);
        assert_eq!(app.focus(), GridCell::new(1, 2));

        // walking back over a selected byte does not toggle it off
        app.execute(Action::SelectUp);
        assert_eq!(app.highlighted().len(), 4);
    }

    #[test]
    fn focus_past_end_of_data_has_no_offset() {
        let mut app = app(vec![0; 10], false);
        for _ in 0..9 {
            app.execute(Action::FocusRight);
        }
        assert_eq!(app.status_offset(), Some(9));
        app.execute(Action::FocusRight);
        assert_eq!(app.status_offset(), None);
        app.execute(Action::FocusDown);
        app.execute(Action::FocusDown);
        app.execute(Action::FocusDown);
        app.execute(Action::ToggleSelect);
        assert_eq!(app.status_offset(), None);
        assert!(app.status_line().contains("Offset: -"));
    }

    #[test]
    fn resize_clamps_focus() {
        let mut app = app(vec![0; 1000], false);
        app.execute(Action::FocusDown);
        app.execute(Action::FocusDown);
        app.execute(Action::FocusDown);
        app.set_visible_rows(2);
        assert_eq!(app.focus().row, 1);
        assert_eq!(app.frame().rows(), 2);
    }
}
