use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::buffer::{BufferError, ByteSource};
use crate::encoding::CodePage;
use crate::view::{FrameBuilder, GridCell, RenderFrame, SelectionDelta, SelectionSync, Viewport};

/// One viewing/editing session: at most one open source, one viewport.
///
/// This is the surface the presentation layer drives. Navigation never
/// fails; only opening, writing and flushing report errors.
#[derive(Debug)]
pub struct Session {
    source: Option<ByteSource>,
    viewport: Viewport,
    builder: FrameBuilder,
    selection: SelectionSync,
}

impl Session {
    /// # Panics
    ///
    /// Panics if `columns` is zero.
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            source: None,
            viewport: Viewport::new(columns, rows, 0),
            builder: FrameBuilder::default(),
            selection: SelectionSync::new(columns),
        }
    }

    pub fn with_code_page(mut self, code_page: CodePage) -> Self {
        self.builder = FrameBuilder::new(code_page);
        self
    }

    /// Open a buffer or a file, closing the current source first.
    pub fn open(
        &mut self,
        data: Option<Vec<u8>>,
        path: Option<&Path>,
        writable: bool,
    ) -> Result<(), BufferError> {
        self.close();
        let source = ByteSource::open(data, path, writable)?;
        self.install(source);
        Ok(())
    }

    pub fn open_bytes(&mut self, data: Vec<u8>, writable: bool) {
        self.close();
        self.install(ByteSource::from_bytes(data, writable));
    }

    pub fn open_file(&mut self, path: impl Into<PathBuf>, writable: bool) -> Result<(), BufferError> {
        self.close();
        let source = ByteSource::open_file(path, writable)?;
        self.install(source);
        Ok(())
    }

    fn install(&mut self, source: ByteSource) {
        self.viewport.set_length(source.len());
        info!(label = %Self::label_for(&source), "source opened");
        self.source = Some(source);
    }

    /// Close the current source, if any. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
            self.viewport.set_length(0);
            debug!("session source closed");
        }
    }

    pub fn source(&self) -> Option<&ByteSource> {
        self.source.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn columns(&self) -> usize {
        self.viewport.columns()
    }

    pub fn len(&self) -> usize {
        self.viewport.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewport.is_empty()
    }

    pub fn is_writable(&self) -> bool {
        self.source.as_ref().is_some_and(ByteSource::is_writable)
    }

    pub fn code_page(&self) -> CodePage {
        self.builder.code_page()
    }

    pub fn set_code_page(&mut self, code_page: CodePage) {
        self.builder = FrameBuilder::new(code_page);
    }

    pub fn resize(&mut self, rows: usize) {
        self.viewport.resize(rows);
    }

    pub fn jump_to(&mut self, offset: usize) -> usize {
        self.viewport.jump_to(offset)
    }

    pub fn jump_by_rows(&mut self, delta: isize) -> usize {
        self.viewport.jump_by_rows(delta)
    }

    pub fn jump_by_pages(&mut self, delta: isize) -> usize {
        self.viewport.jump_by_pages(delta)
    }

    pub fn jump_to_row(&mut self, row: usize) -> usize {
        self.viewport.jump_to_row(row)
    }

    /// Render the current window. Without a source every cell is empty.
    pub fn build_frame(&self) -> RenderFrame {
        match &self.source {
            Some(source) => self.builder.build(source, &self.viewport),
            None => self.builder.build_window(&[], &self.viewport),
        }
    }

    pub fn selection(&self) -> &SelectionSync {
        &self.selection
    }

    /// Diff two selections in the combined grid against the current window.
    pub fn sync_selection(
        &self,
        old: &[GridCell],
        new: &[GridCell],
        focused: Option<GridCell>,
    ) -> SelectionDelta {
        self.selection
            .sync(old, new, focused, self.viewport.offset())
    }

    /// Overwrite the byte at an absolute offset.
    pub fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), BufferError> {
        let source = self.source.as_mut().ok_or(BufferError::Closed)?;
        source.write(offset, value)?;
        debug!(offset, value, "byte written");
        Ok(())
    }

    pub fn flush(&self) -> Result<(), BufferError> {
        self.source.as_ref().ok_or(BufferError::Closed)?.flush()
    }

    /// "File: name" or "Raw data (n bytes)"
    pub fn source_label(&self) -> String {
        match &self.source {
            Some(source) => Self::label_for(source),
            None => "-".to_string(),
        }
    }

    fn label_for(source: &ByteSource) -> String {
        match source.path() {
            Some(path) => format!("File: {}", path.display()),
            None => format!("Raw data ({} bytes)", source.len()),
        }
    }
}

/// Status readout for an offset: `0x1F (31)`
pub fn format_offset(offset: usize) -> String {
    format!("0x{:X} ({})", offset, offset)
}
