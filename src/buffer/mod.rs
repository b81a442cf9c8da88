mod source;

pub use source::{Backing, ByteSource};

use thiserror::Error;

/// Errors raised by byte sources.
#[derive(Debug, Error)]
pub enum BufferError {
    /// Neither a buffer nor a path was supplied to `open`.
    #[error("raw data or a file path must be provided")]
    InvalidArgument,

    #[error("source is read-only")]
    ReadOnly,

    #[error("offset {index:#X} is out of range (length {len:#X})")]
    OutOfRange { index: usize, len: usize },

    #[error("source is closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
