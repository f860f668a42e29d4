//! Image Cytometry Standard (ICS)
//!
//! A text header (`.ics`) describing the layout of a raw or gzip
//! compressed payload, stored either in a companion `.ids` file or, for
//! version 2.0, after the header in the same file.

pub mod vocabulary;
pub mod tokenizer;
pub mod companion;
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

pub use checker::IcsChecker;
pub use metadata::{IcsAnnotations, IcsMetadata};
pub use parser::IcsParser;
pub use reader::IcsReader;
pub use writer::IcsWriter;

/// Name under which the format is registered
pub const FORMAT_NAME: &str = "Image Cytometry Standard";

/// Handle tying the ICS roles together
#[derive(Debug, Default)]
pub struct IcsFormat {
    checker: IcsChecker,
    parser: IcsParser,
}

impl IcsFormat {
    pub fn new() -> Self {
        IcsFormat::default()
    }
}

impl FormatHandle for IcsFormat {
    fn name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn checker(&self) -> &dyn Checker {
        &self.checker
    }

    fn open_reader(&self, path: &Path) -> FormatResult<Box<dyn PlaneReader>> {
        let (meta, stream) = self.parser.parse_path(path)?;
        let mut reader = IcsReader::new();
        reader.bind(meta, stream);
        Ok(Box::new(reader))
    }

    fn open_source(&self, source: ParseSource) -> FormatResult<Box<dyn PlaneReader>> {
        let (meta, stream) = self.parser.parse(source)?;
        let mut reader = IcsReader::new();
        reader.bind(meta, stream);
        Ok(Box::new(reader))
    }

    fn create_writer(&self) -> Box<dyn PlaneWriter> {
        Box::new(IcsWriter::new())
    }
}
