//! Generic format pipeline
//!
//! The roles every file family implements (checker, parser, reader, writer),
//! the shared request validation, and the registry that picks a family for
//! a file.

pub mod errors;
pub mod region;
pub mod validation;
pub mod checker;
pub mod parser;
pub mod reader;
pub mod writer;
pub mod handle;
pub mod registry;

pub use errors::{FormatError, FormatResult};
pub use region::Region;
pub use checker::Checker;
pub use parser::{FormatMetadata, ParseSource, Parser};
pub use reader::PlaneReader;
pub use writer::{PlaneWriter, WriterCore, WriterOptions};
pub use handle::FormatHandle;
pub use registry::FormatRegistry;
