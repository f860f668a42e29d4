//! Factory for creating compression handlers

use crate::format::errors::{FormatError, FormatResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::ZlibHandler;
use super::gzip::GzipHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Get a handler by name, case-insensitively
    pub fn get_handler_by_name(name: &str) -> FormatResult<Box<dyn CompressionHandler>> {
        match name.trim().to_lowercase().as_str() {
            "uncompressed" | "none" => Ok(Box::new(UncompressedHandler)),
            "gzip" => Ok(Box::new(GzipHandler)),
            "zlib" | "deflate" => Ok(Box::new(ZlibHandler)),
            _ => Err(FormatError::UnsupportedCompression(format!("Unknown compression type: {}", name))),
        }
    }
}
