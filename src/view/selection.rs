//! Keeps the hex pane and the text pane highlighting the same bytes.
//!
//! The presentation hosts both panes in one combined grid of
//! `rows × 2*columns`: columns `[0, columns)` are hex digits and
//! `[columns, 2*columns)` are decoded glyphs. Selection events arrive as raw
//! coordinates in that combined grid.

use std::collections::BTreeSet;

/// Coordinate in the combined grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

impl GridCell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Hex,
    Text,
}

/// Pane-independent identity of a selected byte: its row and its column
/// within a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectionKey {
    pub row: usize,
    pub col: usize,
}

impl SelectionKey {
    /// Cell showing this byte's hex digits
    pub fn hex_cell(&self) -> GridCell {
        GridCell::new(self.row, self.col)
    }

    /// Cell showing this byte's glyph
    pub fn text_cell(&self, columns: usize) -> GridCell {
        GridCell::new(self.row, self.col + columns)
    }

    /// Both cells that must share this key's style
    pub fn cells(&self, columns: usize) -> [GridCell; 2] {
        [self.hex_cell(), self.text_cell(columns)]
    }

    /// Byte offset of this key given the viewport's first byte
    pub fn byte_offset(&self, viewport_offset: usize, columns: usize) -> usize {
        viewport_offset + self.row * columns + self.col
    }
}

/// Result of one selection change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDelta {
    /// Keys selected before but not now; reset to the default style
    pub to_unhighlight: Vec<SelectionKey>,
    /// Keys selected now but not before; set to the selection accent
    pub to_highlight: Vec<SelectionKey>,
    /// Byte under the focused cell, for the status readout
    pub current_offset: Option<usize>,
}

impl SelectionDelta {
    pub fn is_empty(&self) -> bool {
        self.to_unhighlight.is_empty() && self.to_highlight.is_empty()
    }
}

/// Folds selections from either pane onto the same keys and diffs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSync {
    columns: usize,
}

impl SelectionSync {
    /// # Panics
    ///
    /// Panics if `columns` is zero.
    pub fn new(columns: usize) -> Self {
        assert!(columns > 0, "selection grid needs at least one column");
        Self { columns }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn pane(&self, cell: GridCell) -> Pane {
        if cell.col % (2 * self.columns) < self.columns {
            Pane::Hex
        } else {
            Pane::Text
        }
    }

    /// The same byte's cell in the other pane
    pub fn mirror(&self, cell: GridCell) -> GridCell {
        GridCell::new(cell.row, (cell.col + self.columns) % (2 * self.columns))
    }

    /// A cell and its mirror always share a key.
    pub fn canonical_key(&self, cell: GridCell) -> SelectionKey {
        SelectionKey {
            row: cell.row,
            col: cell.col % self.columns,
        }
    }

    pub fn canonicalize<'a>(
        &self,
        cells: impl IntoIterator<Item = &'a GridCell>,
    ) -> BTreeSet<SelectionKey> {
        cells.into_iter().map(|&c| self.canonical_key(c)).collect()
    }

    /// Byte offset under `focused`, whichever pane it is in
    pub fn focused_offset(&self, focused: GridCell, viewport_offset: usize) -> usize {
        self.canonical_key(focused)
            .byte_offset(viewport_offset, self.columns)
    }

    /// Diff two selections. Keys present in both are left out of the delta.
    pub fn sync(
        &self,
        old: &[GridCell],
        new: &[GridCell],
        focused: Option<GridCell>,
        viewport_offset: usize,
    ) -> SelectionDelta {
        let old = self.canonicalize(old);
        let new = self.canonicalize(new);

        SelectionDelta {
            to_unhighlight: old.difference(&new).copied().collect(),
            to_highlight: new.difference(&old).copied().collect(),
            current_offset: focused.map(|cell| self.focused_offset(cell, viewport_offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(usize, usize)]) -> Vec<GridCell> {
        coords.iter().map(|&(r, c)| GridCell::new(r, c)).collect()
    }

    #[test]
    fn hex_and_text_cells_share_a_key() {
        let sync = SelectionSync::new(16);
        let hex = GridCell::new(2, 5);
        let text = GridCell::new(2, 21);
        assert_eq!(sync.canonical_key(hex), sync.canonical_key(text));
        assert_eq!(sync.mirror(hex), text);
        assert_eq!(sync.mirror(text), hex);
        assert_eq!(sync.pane(hex), Pane::Hex);
        assert_eq!(sync.pane(text), Pane::Text);
    }

    #[test]
    fn key_names_both_glyph_cells() {
        let sync = SelectionSync::new(16);
        let key = sync.canonical_key(GridCell::new(3, 20));
        assert_eq!(key.cells(16), [GridCell::new(3, 4), GridCell::new(3, 20)]);
    }

    #[test]
    fn partial_overlap_is_left_untouched() {
        let sync = SelectionSync::new(16);
        let old = cells(&[(0, 1), (0, 2), (1, 3)]);
        // (0, 18) is the text cell of (0, 2)
        let new = cells(&[(0, 18), (1, 3), (2, 7)]);
        let delta = sync.sync(&old, &new, None, 0);

        assert_eq!(delta.to_unhighlight, vec![SelectionKey { row: 0, col: 1 }]);
        assert_eq!(delta.to_highlight, vec![SelectionKey { row: 2, col: 7 }]);
        assert_eq!(delta.current_offset, None);
    }

    #[test]
    fn selecting_both_panes_of_one_byte_is_one_key() {
        let sync = SelectionSync::new(8);
        let delta = sync.sync(&[], &cells(&[(1, 2), (1, 10)]), None, 0);
        assert_eq!(delta.to_highlight, vec![SelectionKey { row: 1, col: 2 }]);
    }

    #[test]
    fn identical_selections_produce_no_churn() {
        let sync = SelectionSync::new(16);
        let sel = cells(&[(0, 0), (4, 31)]);
        assert!(sync.sync(&sel, &sel, None, 0).is_empty());
    }

    #[test]
    fn delta_is_sorted() {
        let sync = SelectionSync::new(16);
        let delta = sync.sync(&[], &cells(&[(3, 1), (0, 9), (3, 0)]), None, 0);
        let rows_cols: Vec<_> = delta.to_highlight.iter().map(|k| (k.row, k.col)).collect();
        assert_eq!(rows_cols, vec![(0, 9), (3, 0), (3, 1)]);
    }

    #[test]
    fn focused_offset_uses_column_within_pane() {
        let sync = SelectionSync::new(16);
        let hex = sync.sync(&[], &[], Some(GridCell::new(2, 5)), 0x100);
        let text = sync.sync(&[], &[], Some(GridCell::new(2, 21)), 0x100);
        assert_eq!(hex.current_offset, Some(0x100 + 2 * 16 + 5));
        assert_eq!(text.current_offset, hex.current_offset);
    }
}
