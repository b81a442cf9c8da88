use tracing::trace;

use super::Viewport;
use crate::buffer::ByteSource;
use crate::encoding::{display_char, CodePage};

/// One grid position: a byte rendered for both panes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    /// `None` past the end of the data
    pub byte: Option<u8>,
    /// Two uppercase hex digits, or empty
    pub hex_text: String,
    /// One glyph, or empty
    pub char_text: String,
    /// Column parity, used to alternate the accent between adjacent columns
    pub group: u8,
}

impl Cell {
    fn populated(byte: u8, col: usize, code_page: CodePage) -> Self {
        Self {
            byte: Some(byte),
            hex_text: format!("{:02X}", byte),
            char_text: display_char(byte, code_page).to_string(),
            group: (col % 2) as u8,
        }
    }

    fn placeholder(col: usize) -> Self {
        Self {
            group: (col % 2) as u8,
            ..Self::default()
        }
    }

    pub fn is_populated(&self) -> bool {
        self.byte.is_some()
    }
}

/// Materialized `rows × columns` grid for one viewport position.
///
/// Only valid until the next navigation; it is rebuilt from scratch every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFrame {
    offset: usize,
    columns: usize,
    rows: usize,
    cells: Vec<Cell>,
    row_labels: Vec<String>,
    column_labels: Vec<String>,
}

impl RenderFrame {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if col >= self.columns {
            return None;
        }
        self.cells.get(row * self.columns + col)
    }

    /// Cells of one row
    pub fn row(&self, row: usize) -> &[Cell] {
        let start = (row * self.columns).min(self.cells.len());
        let end = (start + self.columns).min(self.cells.len());
        &self.cells[start..end]
    }

    /// `%08X` address of each row's first cell
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Header labels for the combined grid: column numbers over the hex
    /// pane, blanks over the text pane
    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn populated_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_populated()).count()
    }
}

/// Builds [`RenderFrame`]s using a fixed code page
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameBuilder {
    code_page: CodePage,
}

impl FrameBuilder {
    pub fn new(code_page: CodePage) -> Self {
        Self { code_page }
    }

    pub fn code_page(&self) -> CodePage {
        self.code_page
    }

    /// Render the window `viewport` currently shows over `source`.
    ///
    /// Short reads near the end of data leave trailing cells empty.
    pub fn build(&self, source: &ByteSource, viewport: &Viewport) -> RenderFrame {
        let start = viewport.offset();
        let window = source.read(start..start.saturating_add(viewport.page_size()));
        self.build_window(window, viewport)
    }

    /// Render already-read bytes; `window` starts at `viewport.offset()`.
    pub fn build_window(&self, window: &[u8], viewport: &Viewport) -> RenderFrame {
        let columns = viewport.columns();
        let rows = viewport.rows();
        let offset = viewport.offset();
        let page_size = viewport.page_size();

        let cells = (0..page_size)
            .map(|idx| {
                let col = idx % columns;
                match window.get(idx) {
                    Some(&byte) => Cell::populated(byte, col, self.code_page),
                    None => Cell::placeholder(col),
                }
            })
            .collect();

        let row_labels = (0..rows)
            .map(|row| format!("{:08X}", offset + row * columns))
            .collect();

        let column_labels = (0..columns)
            .map(|col| col.to_string())
            .chain(std::iter::repeat_n(String::new(), columns))
            .collect();

        trace!(offset, rows, columns, populated = window.len().min(page_size), "frame built");

        RenderFrame {
            offset,
            columns,
            rows,
            cells,
            row_labels,
            column_labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_for(data: Vec<u8>, rows: usize, offset: usize) -> RenderFrame {
        let source = ByteSource::from_bytes(data, false);
        let mut viewport = Viewport::new(16, rows, source.len());
        viewport.jump_to(offset);
        FrameBuilder::default().build(&source, &viewport)
    }

    #[test]
    fn short_source_fills_leading_cells_only() {
        let frame = frame_for(b"ABCDEFGHIJ".to_vec(), 4, 0);
        assert_eq!(frame.cells().len(), 64);
        assert_eq!(frame.populated_count(), 10);
        assert!(frame.cells()[..10].iter().all(Cell::is_populated));
        assert!(frame.cells()[10..].iter().all(|c| !c.is_populated()
            && c.hex_text.is_empty()
            && c.char_text.is_empty()));
    }

    #[test]
    fn hex_and_char_text() {
        let frame = frame_for(vec![0x41, 0x0A, 0xFF, 0x00], 1, 0);
        let a = frame.cell(0, 0).unwrap();
        assert_eq!(a.byte, Some(0x41));
        assert_eq!(a.hex_text, "41");
        assert_eq!(a.char_text, "A");

        let lf = frame.cell(0, 1).unwrap();
        assert_eq!(lf.hex_text, "0A");
        assert_eq!(lf.char_text, " ");

        let ff = frame.cell(0, 2).unwrap();
        assert_eq!(ff.hex_text, "FF");
        assert_eq!(ff.char_text.chars().count(), 1);

        assert_eq!(frame.cell(0, 3).unwrap().char_text, " ");
    }

    #[test]
    fn groups_alternate_by_column() {
        let frame = frame_for(vec![0; 32], 2, 0);
        let groups: Vec<u8> = frame.row(1).iter().map(|c| c.group).collect();
        assert_eq!(&groups[..4], &[0, 1, 0, 1]);
        assert_eq!(frame.cell(1, 15).unwrap().group, 1);
    }

    #[test]
    fn row_labels_follow_offset() {
        let frame = frame_for(vec![0; 4096], 3, 0x123);
        assert_eq!(frame.offset(), 0x123);
        assert_eq!(frame.row_labels(), &["00000123", "00000133", "00000143"]);
    }

    #[test]
    fn cells_are_read_from_offset() {
        let data: Vec<u8> = (0..=255).collect();
        let frame = frame_for(data, 2, 200);
        assert_eq!(frame.cell(0, 0).unwrap().byte, Some(200));
        assert_eq!(frame.cell(1, 15).unwrap().byte, Some(231));
    }

    #[test]
    fn column_labels_cover_both_panes() {
        let frame = frame_for(vec![1, 2, 3], 1, 0);
        let labels = frame.column_labels();
        assert_eq!(labels.len(), 32);
        assert_eq!(labels[0], "0");
        assert_eq!(labels[15], "15");
        assert!(labels[16..].iter().all(String::is_empty));
    }

    #[test]
    fn empty_source_renders_placeholders() {
        let frame = frame_for(Vec::new(), 2, 0);
        assert_eq!(frame.populated_count(), 0);
        assert_eq!(frame.row_labels(), &["00000000", "00000010"]);
    }

    #[test]
    fn single_byte_source() {
        let frame = frame_for(vec![0x7E], 1, 0);
        assert_eq!(frame.populated_count(), 1);
        assert_eq!(frame.cell(0, 0).unwrap().char_text, "~");
    }

    #[test]
    fn code_page_changes_glyphs_only() {
        let source = ByteSource::from_bytes(vec![0x80], false);
        let viewport = Viewport::new(16, 1, 1);
        let cp437 = FrameBuilder::default().build(&source, &viewport);
        let cp1252 = FrameBuilder::new(CodePage::Windows1252).build(&source, &viewport);
        assert_eq!(cp437.cell(0, 0).unwrap().char_text, "\u{00C7}");
        assert_eq!(cp1252.cell(0, 0).unwrap().char_text, "\u{20AC}");
        assert_eq!(cp437.cell(0, 0).unwrap().hex_text, cp1252.cell(0, 0).unwrap().hex_text);
    }
}
