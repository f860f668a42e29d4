//! ICS format detection

use std::io::Read;

use crate::format::checker::{self, Checker};
use crate::ics::companion::VERSION_PREFIX_LENGTH;
use crate::ics::FORMAT_NAME;
use crate::io::seekable::SeekableReader;

/// Keyword every ICS header starts with
pub const HEADER_KEYWORD: &str = "ics_version";

/// Suffixes of ICS headers and data files
pub const SUFFIXES: [&str; 2] = ["ics", "ids"];

/// Detector for ICS headers
#[derive(Debug, Default, Clone, Copy)]
pub struct IcsChecker;

impl Checker for IcsChecker {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn suffixes(&self) -> &'static [&'static str] {
        &SUFFIXES
    }

    fn suffix_sufficient(&self) -> bool {
        true
    }

    fn is_format(&self, reader: &mut dyn SeekableReader) -> bool {
        checker::inspect(reader, |stream| {
            let mut prefix = Vec::with_capacity(VERSION_PREFIX_LENGTH);
            stream.take(VERSION_PREFIX_LENGTH as u64).read_to_end(&mut prefix)?;
            Ok(String::from_utf8_lossy(&prefix).trim().starts_with(HEADER_KEYWORD))
        })
    }
}
