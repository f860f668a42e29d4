//! Custom error types for format processing

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised while checking, parsing, reading or writing image files
#[derive(Debug)]
pub enum FormatError {
    /// I/O error from the underlying stream, passed through unchanged
    IoError(io::Error),
    /// Content not recognized by any checker or parser
    UnsupportedFormat(String),
    /// File or record version beyond what the parser understands
    UnsupportedVersion(i64),
    /// A file required alongside the opened one is absent
    MissingCompanionFile(PathBuf),
    /// Malformed or truncated structural fields
    CorruptHeader(String),
    /// Axis count or pixel kind combination that cannot be represented
    UnsupportedDimensionality(String),
    /// Unknown compression code or an unsupported decompressor requirement
    UnsupportedCompression(String),
    /// Compressed payload ended before the expected bytes were produced
    CorruptData(String),
    /// Image, plane or region index outside the valid range
    IndexOutOfRange(String),
    /// Caller supplied buffer cannot hold the requested region
    BufferTooSmall {
        /// Minimum number of bytes needed
        required: usize,
        /// Number of bytes supplied
        actual: usize,
    },
    /// Operation attempted before metadata or a stream was bound
    NotConfigured(String),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::IoError(e) => write!(f, "I/O error: {}", e),
            FormatError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            FormatError::UnsupportedVersion(v) => write!(f, "Unsupported version: {}", v),
            FormatError::MissingCompanionFile(path) => {
                write!(f, "Missing companion file: {}", path.display())
            }
            FormatError::CorruptHeader(msg) => write!(f, "Corrupt header: {}", msg),
            FormatError::UnsupportedDimensionality(msg) => {
                write!(f, "Unsupported dimensionality: {}", msg)
            }
            FormatError::UnsupportedCompression(msg) => {
                write!(f, "Unsupported compression: {}", msg)
            }
            FormatError::CorruptData(msg) => write!(f, "Corrupt data: {}", msg),
            FormatError::IndexOutOfRange(msg) => write!(f, "Index out of range: {}", msg),
            FormatError::BufferTooSmall { required, actual } => write!(
                f,
                "Buffer is too small; expected {} bytes, got {} bytes",
                required, actual
            ),
            FormatError::NotConfigured(msg) => write!(f, "Not configured: {}", msg),
            FormatError::GenericError(msg) => write!(f, "Format error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FormatError {
    fn from(error: io::Error) -> Self {
        FormatError::IoError(error)
    }
}

/// Result type for format operations
pub type FormatResult<T> = Result<T, FormatError>;

impl From<String> for FormatError {
    fn from(msg: String) -> Self {
        FormatError::GenericError(msg)
    }
}
