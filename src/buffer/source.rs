use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapMut};
use tracing::{debug, warn};

use super::BufferError;

/// Where the bytes of a source live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    Memory,
    MappedFile,
}

/// Storage behind a [`ByteSource`].
enum Storage {
    /// Owned buffer (also used for zero-length files, which cannot be mapped)
    Memory(Vec<u8>),
    /// Read-only mapping; the file handle is kept alive alongside it
    Mapped { _file: File, map: Mmap },
    /// Read-write mapping
    MappedMut { _file: File, map: MmapMut },
    Closed,
}

/// Fixed-length, addressable byte sequence backed by a buffer or a mapped file.
///
/// The length is captured at open time and never changes. Only the bytes that
/// are actually read are paged in from a mapping.
pub struct ByteSource {
    storage: Storage,
    backing: Backing,
    path: Option<PathBuf>,
    len: usize,
    writable: bool,
}

impl ByteSource {
    /// Open a source from a buffer or a file path.
    ///
    /// When both are given the path wins. Fails with
    /// [`BufferError::InvalidArgument`] when neither is given.
    pub fn open(
        data: Option<Vec<u8>>,
        path: Option<&Path>,
        writable: bool,
    ) -> Result<Self, BufferError> {
        match (path, data) {
            (Some(path), _) => Self::open_file(path, writable),
            (None, Some(data)) => Ok(Self::from_bytes(data, writable)),
            (None, None) => Err(BufferError::InvalidArgument),
        }
    }

    /// Wrap an in-memory buffer
    pub fn from_bytes(data: Vec<u8>, writable: bool) -> Self {
        debug!(len = data.len(), writable, "opened memory source");
        Self {
            len: data.len(),
            storage: Storage::Memory(data),
            backing: Backing::Memory,
            path: None,
            writable,
        }
    }

    /// Map a file into memory, read-write when `writable` is set.
    pub fn open_file(path: impl Into<PathBuf>, writable: bool) -> Result<Self, BufferError> {
        let path = path.into();
        let file = OpenOptions::new().read(true).write(writable).open(&path)?;
        let file_len = usize::try_from(file.metadata()?.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "file does not fit in the address space")
        })?;

        let storage = if file_len == 0 {
            Storage::Memory(Vec::new())
        } else if writable {
            // SAFETY: the file handle lives as long as the mapping. Concurrent
            // modification of the file by other processes is unsupported.
            let map = unsafe { MmapMut::map_mut(&file)? };
            Storage::MappedMut { _file: file, map }
        } else {
            // SAFETY: as above; the mapping is only exposed as &[u8].
            let map = unsafe { Mmap::map(&file)? };
            Storage::Mapped { _file: file, map }
        };

        let len = match &storage {
            Storage::Mapped { map, .. } => map.len(),
            Storage::MappedMut { map, .. } => map.len(),
            _ => 0,
        };
        debug!(path = %path.display(), len, writable, "mapped file source");

        Ok(Self {
            storage,
            backing: Backing::MappedFile,
            path: Some(path),
            len,
            writable,
        })
    }

    /// Length fixed at open time
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.storage, Storage::Closed)
    }

    pub fn backing(&self) -> Backing {
        self.backing
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File name of a mapped source
    pub fn filename(&self) -> Option<&str> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
    }

    fn bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Memory(data) => data.as_slice(),
            Storage::Mapped { map, .. } => &map[..],
            Storage::MappedMut { map, .. } => &map[..],
            Storage::Closed => &[],
        }
    }

    /// Bytes in `range` clamped to `[0, len)`.
    ///
    /// Never fails: a range past the end yields a short (possibly empty) slice,
    /// and a closed source yields nothing.
    pub fn read(&self, range: Range<usize>) -> &[u8] {
        let bytes = self.bytes();
        let end = range.end.min(bytes.len());
        if range.start >= end {
            return &[];
        }
        &bytes[range.start..end]
    }

    /// Byte at `index`
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes().get(index).copied()
    }

    /// Overwrite one byte. Visible to the next read immediately.
    pub fn write(&mut self, index: usize, value: u8) -> Result<(), BufferError> {
        if !self.writable {
            warn!(index, "write rejected: source is read-only");
            return Err(BufferError::ReadOnly);
        }
        let len = self.len;
        let bytes: &mut [u8] = match &mut self.storage {
            Storage::Memory(data) => data.as_mut_slice(),
            Storage::MappedMut { map, .. } => &mut map[..],
            Storage::Mapped { .. } => return Err(BufferError::ReadOnly),
            Storage::Closed => return Err(BufferError::Closed),
        };
        let slot = bytes
            .get_mut(index)
            .ok_or(BufferError::OutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Flush dirty pages of a writable mapping to disk
    pub fn flush(&self) -> Result<(), BufferError> {
        match &self.storage {
            Storage::MappedMut { map, .. } => {
                map.flush()?;
                debug!(path = ?self.path, "flushed mapping");
                Ok(())
            }
            Storage::Closed => Err(BufferError::Closed),
            _ => Ok(()),
        }
    }

    /// Release the mapping and the file handle. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        self.storage = Storage::Closed;
        debug!(path = ?self.path, "closed source");
    }
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSource")
            .field("backing", &self.backing)
            .field("path", &self.path)
            .field("len", &self.len)
            .field("writable", &self.writable)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn temp_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn open_without_data_or_path_is_invalid() {
        let err = ByteSource::open(None, None, false).unwrap_err();
        assert!(matches!(err, BufferError::InvalidArgument));
    }

    #[test]
    fn empty_buffer_is_a_valid_source() {
        let source = ByteSource::open(Some(Vec::new()), None, false).unwrap();
        assert_eq!(source.len(), 0);
        assert!(source.read(0..16).is_empty());
    }

    #[test]
    fn read_clamps_to_length() {
        let source = ByteSource::from_bytes(vec![1, 2, 3, 4], false);
        assert_eq!(source.read(2..100), &[3, 4]);
        assert!(source.read(10..20).is_empty());
        assert!(source.read(3..1).is_empty());
    }

    #[test]
    fn write_on_read_only_source_fails_and_keeps_byte() {
        let mut source = ByteSource::from_bytes(vec![0xAA], false);
        assert!(matches!(source.write(0, 0x55), Err(BufferError::ReadOnly)));
        assert_eq!(source.get(0), Some(0xAA));
    }

    #[test]
    fn write_past_end_is_out_of_range() {
        let mut source = ByteSource::from_bytes(vec![0; 4], true);
        let err = source.write(4, 1).unwrap_err();
        assert!(matches!(err, BufferError::OutOfRange { index: 4, len: 4 }));
    }

    #[test]
    fn writable_memory_write_is_visible() {
        let mut source = ByteSource::from_bytes(vec![0; 4], true);
        source.write(2, 0x7F).unwrap();
        assert_eq!(source.read(2..3), &[0x7F]);
    }

    #[test]
    fn close_is_idempotent() {
        let mut source = ByteSource::from_bytes(vec![1, 2, 3], true);
        source.close();
        source.close();
        assert!(source.is_closed());
        assert_eq!(source.len(), 3);
        assert!(source.read(0..3).is_empty());
        assert!(matches!(source.write(0, 9), Err(BufferError::Closed)));
    }

    #[test]
    fn path_takes_precedence_over_data() {
        let file = temp_file(b"from file");
        let source = ByteSource::open(Some(b"buffer".to_vec()), Some(file.path()), false).unwrap();
        assert_eq!(source.backing(), Backing::MappedFile);
        assert_eq!(source.read(0..4), b"from");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ByteSource::open_file(dir.path().join("missing.bin"), false).unwrap_err();
        assert!(matches!(err, BufferError::Io(_)));
    }

    #[test]
    fn read_only_mapping_rejects_writes() {
        let file = temp_file(&[0x10, 0x20, 0x30]);
        let mut source = ByteSource::open_file(file.path(), false).unwrap();
        assert_eq!(source.len(), 3);
        assert!(matches!(source.write(1, 0), Err(BufferError::ReadOnly)));
        assert_eq!(source.get(1), Some(0x20));
    }

    #[test]
    fn writable_mapping_writes_through_to_file() {
        let file = temp_file(&[0u8; 8]);
        let mut source = ByteSource::open_file(file.path(), true).unwrap();
        source.write(5, 0xEE).unwrap();
        source.flush().unwrap();
        source.close();

        let contents = std::fs::read(file.path()).unwrap();
        assert_eq!(contents[5], 0xEE);
    }

    #[test]
    fn zero_length_file_opens_without_mapping() {
        let file = temp_file(&[]);
        let source = ByteSource::open_file(file.path(), true).unwrap();
        assert_eq!(source.len(), 0);
        assert_eq!(source.backing(), Backing::MappedFile);
        assert!(source.read(0..1).is_empty());
    }
}
