//! Handler for zlib wrapped deflate data

use std::io::Read;
use flate2::read::ZlibDecoder;
use crate::format::errors::{FormatError, FormatResult};
use super::handler::CompressionHandler;

/// Zlib (RFC 1950) compression handler
pub struct ZlibHandler;

impl CompressionHandler for ZlibHandler {
    fn decompress(&self, data: &[u8]) -> FormatResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decompressed_data = Vec::new();
        match decoder.read_to_end(&mut decompressed_data) {
            Ok(_) => Ok(decompressed_data),
            Err(e) => Err(FormatError::CorruptData(format!("zlib stream: {}", e))),
        }
    }

    fn name(&self) -> &'static str {
        "zlib"
    }
}
