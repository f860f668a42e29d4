//! Handler for uncompressed data

use crate::format::errors::FormatResult;
use super::handler::CompressionHandler;

/// Identity handler
pub struct UncompressedHandler;

impl CompressionHandler for UncompressedHandler {
    fn decompress(&self, data: &[u8]) -> FormatResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn name(&self) -> &'static str {
        "uncompressed"
    }

    fn is_identity(&self) -> bool {
        true
    }
}
