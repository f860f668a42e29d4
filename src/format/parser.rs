//! Header parsing
//!
//! Parsers turn the header of a file (plus any companion files) into a
//! format-specific metadata value that wraps the generic [`Metadata`].

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::time::SystemTime;

use crate::format::errors::FormatResult;
use crate::io::seekable::SeekableReader;
use crate::metadata::Metadata;

/// Format-specific metadata that exposes the generic dataset description
pub trait FormatMetadata: Send {
    /// The generic dataset description
    fn metadata(&self) -> &Metadata;

    /// Mutable access to the generic dataset description
    fn metadata_mut(&mut self) -> &mut Metadata;
}

/// Streams and file facts handed to a parser
pub struct ParseSource {
    /// Dataset name, usually the file name
    pub name: Option<String>,
    /// The stream holding the header
    pub header: Box<dyn SeekableReader>,
    /// Separate pixel data stream, when the format splits header and data
    pub data: Option<Box<dyn SeekableReader>>,
    /// Modification time of the header file, when known
    pub modified: Option<SystemTime>,
}

impl ParseSource {
    /// Wraps a single in-memory or already opened stream
    pub fn from_stream(header: Box<dyn SeekableReader>) -> Self {
        ParseSource {
            name: None,
            header,
            data: None,
            modified: None,
        }
    }

    /// Opens a file as the header stream
    pub fn open<P: AsRef<Path>>(path: P) -> FormatResult<Self> {
        let path = path.as_ref();
        let header = open_stream(path)?;
        Ok(ParseSource {
            name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            header,
            data: None,
            modified: fs::metadata(path).and_then(|m| m.modified()).ok(),
        })
    }

    /// Attaches a separate pixel data stream
    pub fn with_data(mut self, data: Box<dyn SeekableReader>) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the dataset name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// Opens a file for buffered random access
pub fn open_stream(path: &Path) -> FormatResult<Box<dyn SeekableReader>> {
    let file = File::open(path)?;
    Ok(Box::new(BufReader::new(file)))
}

/// Strategy trait for building metadata from a header
pub trait Parser: Send + Sync {
    /// Format-specific metadata produced by this parser
    type Meta: FormatMetadata;

    /// Parses the header
    ///
    /// # Arguments
    /// * `source` - Header stream and optional companion data stream
    ///
    /// # Returns
    /// The metadata and the stream the pixel reader must bind to
    fn parse(&self, source: ParseSource) -> FormatResult<(Self::Meta, Box<dyn SeekableReader>)>;

    /// Resolves companion files for `path` and parses
    ///
    /// The default treats the file as self-contained.
    fn parse_path(&self, path: &Path) -> FormatResult<(Self::Meta, Box<dyn SeekableReader>)> {
        self.parse(ParseSource::open(path)?)
    }
}
