//! OBF format detection

use crate::format::checker::{self, Checker};
use crate::io::seekable::SeekableReader;
use crate::obf::constants::header::FILE_VERSION;
use crate::obf::parser::read_file_version;
use crate::obf::FORMAT_NAME;

/// Suffixes of OBF files and Imspector measurements
pub const SUFFIXES: [&str; 2] = ["obf", "msr"];

/// Detector for OBF files; relies on the file magic only
#[derive(Debug, Default, Clone, Copy)]
pub struct ObfChecker;

impl Checker for ObfChecker {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn suffixes(&self) -> &'static [&'static str] {
        &SUFFIXES
    }

    fn is_format(&self, reader: &mut dyn SeekableReader) -> bool {
        checker::inspect(reader, |stream| {
            Ok(matches!(read_file_version(stream)?, Some(version) if (0..=FILE_VERSION).contains(&version)))
        })
    }
}
