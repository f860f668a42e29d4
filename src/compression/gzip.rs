//! Handler for gzip framed data

use std::io::Read;
use flate2::read::MultiGzDecoder;
use crate::format::errors::{FormatError, FormatResult};
use super::handler::CompressionHandler;

/// Gzip (RFC 1952) compression handler
///
/// Concatenated members are decoded as one stream.
pub struct GzipHandler;

impl CompressionHandler for GzipHandler {
    fn decompress(&self, data: &[u8]) -> FormatResult<Vec<u8>> {
        let mut decoder = MultiGzDecoder::new(data);
        let mut decompressed_data = Vec::new();
        match decoder.read_to_end(&mut decompressed_data) {
            Ok(_) => Ok(decompressed_data),
            Err(e) => Err(FormatError::CorruptData(format!("gzip stream: {}", e))),
        }
    }

    fn name(&self) -> &'static str {
        "gzip"
    }
}
