//! Compression handler trait definition

use crate::format::errors::FormatResult;

/// Strategy trait for whole-buffer compression methods
pub trait CompressionHandler: Send + Sync {
    /// Decompress the data
    fn decompress(&self, data: &[u8]) -> FormatResult<Vec<u8>>;

    /// Get the name of this compression method
    fn name(&self) -> &'static str;

    /// Whether the method changes the bytes at all
    fn is_identity(&self) -> bool {
        false
    }
}
