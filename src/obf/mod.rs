//! Imspector OMAS_BF (OBF)
//!
//! Little-endian binary files holding a chain of stacks, each a dense
//! array of up to five dimensions, raw or as one zlib stream.

pub mod constants;
pub mod stack;
pub mod metadata;
pub mod checker;
pub mod parser;
pub mod reader;
pub mod writer;
#[cfg(test)]
mod tests;

use std::path::Path;

use crate::format::checker::Checker;
use crate::format::errors::FormatResult;
use crate::format::handle::FormatHandle;
use crate::format::parser::{ParseSource, Parser};
use crate::format::reader::PlaneReader;
use crate::format::writer::PlaneWriter;

pub use checker::ObfChecker;
pub use metadata::ObfMetadata;
pub use parser::ObfParser;
pub use reader::ObfReader;
pub use stack::StackDescriptor;
pub use writer::ObfWriter;

/// Name under which the format is registered
pub const FORMAT_NAME: &str = "OBF";

/// Handle tying the OBF roles together
#[derive(Debug, Default)]
pub struct ObfFormat {
    checker: ObfChecker,
    parser: ObfParser,
}

impl ObfFormat {
    pub fn new() -> Self {
        ObfFormat::default()
    }
}

impl FormatHandle for ObfFormat {
    fn name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn checker(&self) -> &dyn Checker {
        &self.checker
    }

    fn open_reader(&self, path: &Path) -> FormatResult<Box<dyn PlaneReader>> {
        let (meta, stream) = self.parser.parse_path(path)?;
        let mut reader = ObfReader::new();
        reader.bind(meta, stream);
        Ok(Box::new(reader))
    }

    fn open_source(&self, source: ParseSource) -> FormatResult<Box<dyn PlaneReader>> {
        let (meta, stream) = self.parser.parse(source)?;
        let mut reader = ObfReader::new();
        reader.bind(meta, stream);
        Ok(Box::new(reader))
    }

    fn create_writer(&self) -> Box<dyn PlaneWriter> {
        Box::new(ObfWriter::new())
    }
}
