//! Format handles
//!
//! A handle ties the four roles of one file family together: the checker,
//! the parser (through `open_reader`), the reader and the writer.

use std::path::Path;

use crate::format::checker::Checker;
use crate::format::errors::FormatResult;
use crate::format::parser::ParseSource;
use crate::format::reader::PlaneReader;
use crate::format::writer::PlaneWriter;

/// Entry point for one file family
pub trait FormatHandle: Send + Sync {
    /// Human readable name of the format
    fn name(&self) -> &'static str;

    /// The format's detector
    fn checker(&self) -> &dyn Checker;

    /// Lowercase file suffixes, without the dot
    fn suffixes(&self) -> &'static [&'static str] {
        self.checker().suffixes()
    }

    /// Parses a file (and its companions) and binds a reader to it
    fn open_reader(&self, path: &Path) -> FormatResult<Box<dyn PlaneReader>>;

    /// Parses already opened streams and binds a reader to them
    fn open_source(&self, source: ParseSource) -> FormatResult<Box<dyn PlaneReader>>;

    /// Creates an unconfigured writer
    fn create_writer(&self) -> Box<dyn PlaneWriter>;
}
