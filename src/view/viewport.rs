use tracing::trace;

/// Visible rectangular window into a byte source.
///
/// Every navigation primitive funnels through [`Viewport::jump_to`], which
/// clamps the requested offset into `[0, max(0, len - page_size)]`.
/// Out-of-range requests are tolerated, never rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    /// Bytes per row; immutable
    columns: usize,
    rows: usize,
    /// Offset of the first visible byte
    offset: usize,
    /// Length of the bound source
    len: usize,
}

impl Viewport {
    /// # Panics
    ///
    /// Panics if `columns` is zero.
    pub fn new(columns: usize, rows: usize, len: usize) -> Self {
        assert!(columns > 0, "viewport needs at least one column");
        Self {
            columns,
            rows: rows.max(1),
            offset: 0,
            len,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of cells in one page
    pub fn page_size(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }

    /// Largest valid offset
    pub fn max_offset(&self) -> usize {
        self.len.saturating_sub(self.page_size())
    }

    /// Upper bound of a row-based scrollbar (`len / columns`)
    pub fn total_rows(&self) -> usize {
        self.len / self.columns
    }

    /// Row index of the current offset
    pub fn current_row(&self) -> usize {
        self.offset / self.columns
    }

    /// Bind to a source of a different length; the window returns to the top.
    pub fn set_length(&mut self, len: usize) {
        self.len = len;
        self.offset = 0;
    }

    /// Change the number of visible rows, keeping the offset if it is still valid.
    pub fn resize(&mut self, rows: usize) {
        self.rows = rows.max(1);
        let offset = self.offset;
        self.jump_to(offset);
        trace!(rows = self.rows, offset = self.offset, "viewport resized");
    }

    /// Move the window to `requested`, clamped into the valid range.
    pub fn jump_to(&mut self, requested: usize) -> usize {
        self.offset = requested.min(self.max_offset());
        trace!(requested, offset = self.offset, "jump");
        self.offset
    }

    /// Scroll by whole rows. Positive `delta` moves toward lower offsets (up).
    pub fn jump_by_rows(&mut self, delta: isize) -> usize {
        self.jump_relative(delta, self.columns)
    }

    /// Scroll by whole pages. Positive `delta` moves toward lower offsets (up).
    pub fn jump_by_pages(&mut self, delta: isize) -> usize {
        self.jump_relative(delta, self.page_size())
    }

    /// Jump to an absolute row, e.g. from a scrollbar position.
    pub fn jump_to_row(&mut self, row: usize) -> usize {
        self.jump_to(row.saturating_mul(self.columns))
    }

    /// `jump_to(offset - delta * unit)` with saturating arithmetic: anything
    /// below zero lands on 0 and anything past the address space lands on the
    /// maximum offset.
    fn jump_relative(&mut self, delta: isize, unit: usize) -> usize {
        let shift = delta.unsigned_abs().saturating_mul(unit);
        let target = if delta >= 0 {
            self.offset.saturating_sub(shift)
        } else {
            self.offset.saturating_add(shift)
        };
        self.jump_to(target)
    }
}
