//! Explicit format registry
//!
//! Formats are registered by hand in priority order; lookups ask each
//! checker in turn.

use std::path::Path;

use log::debug;

use crate::format::errors::{FormatError, FormatResult};
use crate::format::handle::FormatHandle;
use crate::ics::IcsFormat;
use crate::io::seekable::SeekableReader;
use crate::obf::ObfFormat;

/// Ordered collection of format handles
pub struct FormatRegistry {
    formats: Vec<Box<dyn FormatHandle>>,
}

impl Default for FormatRegistry {
    /// Registry with ICS followed by OBF
    fn default() -> Self {
        let mut registry = FormatRegistry::new();
        registry.register(Box::new(IcsFormat::new()));
        registry.register(Box::new(ObfFormat::new()));
        registry
    }
}

impl FormatRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        FormatRegistry { formats: Vec::new() }
    }

    /// Appends a format; earlier registrations win lookups
    pub fn register(&mut self, format: Box<dyn FormatHandle>) {
        debug!("Registering format {}", format.name());
        self.formats.push(format);
    }

    /// Finds a format by name or by one of its suffixes, case-insensitively
    pub fn get(&self, name: &str) -> Option<&dyn FormatHandle> {
        self.formats
            .iter()
            .find(|format| {
                format.name().eq_ignore_ascii_case(name)
                    || format.suffixes().iter().any(|suffix| suffix.eq_ignore_ascii_case(name))
            })
            .map(|format| &**format)
    }

    /// Names of every registered format
    pub fn names(&self) -> Vec<&'static str> {
        self.formats.iter().map(|format| format.name()).collect()
    }

    /// Finds the format of a file
    ///
    /// # Returns
    /// The first format whose checker accepts the path, else `UnsupportedFormat`
    pub fn lookup(&self, path: &Path) -> FormatResult<&dyn FormatHandle> {
        self.formats
            .iter()
            .find(|format| format.checker().is_format_path(path))
            .map(|format| &**format)
            .ok_or_else(|| {
                FormatError::UnsupportedFormat(format!("no registered format recognizes {}", path.display()))
            })
    }

    /// Finds the format of a stream by content alone
    pub fn lookup_stream(&self, reader: &mut dyn SeekableReader) -> FormatResult<&dyn FormatHandle> {
        self.formats
            .iter()
            .find(|format| format.checker().is_format(reader))
            .map(|format| &**format)
            .ok_or_else(|| FormatError::UnsupportedFormat("no registered format recognizes the stream".to_string()))
    }
}
