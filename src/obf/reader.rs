//! OBF plane reading
//!
//! Uncompressed stacks are read in place. Compressed stacks are one zlib
//! stream per stack, so planes are decoded front to back into a single
//! cached frame; asking for an earlier plane restarts the stream.

use std::path::Path;

use log::debug;

use crate::compression::StreamInflater;
use crate::format::errors::{FormatError, FormatResult};
use crate::format::parser::{FormatMetadata, Parser};
use crate::format::reader::{self, PlaneReader};
use crate::format::region::Region;
use crate::format::validation;
use crate::io::seekable::SeekableReader;
use crate::metadata::Metadata;
use crate::obf::metadata::ObfMetadata;
use crate::obf::parser::ObfParser;
use crate::obf::stack::StackDescriptor;
use crate::obf::FORMAT_NAME;

/// Last decoded frame of a compressed stack
struct DecodeSession {
    image_index: Option<usize>,
    /// Plane held in `frame`; None when the frame is not valid
    frame_number: Option<usize>,
    frame: Vec<u8>,
    inflater: Option<StreamInflater>,
}

impl DecodeSession {
    fn new() -> Self {
        DecodeSession {
            image_index: None,
            frame_number: None,
            frame: Vec::new(),
            inflater: None,
        }
    }

    /// Switches the cache to another stack
    fn select(&mut self, image_index: usize, stack: &StackDescriptor, frame_bytes: usize) {
        if self.image_index != Some(image_index) {
            debug!("Decoding stack {} from position {}", image_index, stack.position);
            self.frame = vec![0u8; frame_bytes];
            self.image_index = Some(image_index);
            self.frame_number = None;
            self.inflater = Some(StreamInflater::new(stack.position, stack.length));
        }
    }

    /// Decodes frames until `plane_index` is cached
    fn advance(&mut self, stream: &mut dyn SeekableReader, plane_index: usize) -> FormatResult<()> {
        if self.frame_number == Some(plane_index) {
            return Ok(());
        }
        if matches!(self.frame_number, Some(current) if plane_index < current) {
            self.frame_number = None;
        }
        let inflater = self
            .inflater
            .as_mut()
            .ok_or_else(|| FormatError::GenericError("no stack selected for decoding".to_string()))?;
        if self.frame_number.is_none() {
            inflater.reset();
        }
        while self.frame_number != Some(plane_index) {
            if let Err(e) = inflater.fill_exact(stream, &mut self.frame) {
                self.frame_number = None;
                return Err(e);
            }
            self.frame_number = Some(self.frame_number.map_or(0, |number| number + 1));
        }
        debug!(
            "Plane {} of stack {:?} decoded, {} bytes inflated",
            plane_index,
            self.image_index,
            inflater.total_out()
        );
        Ok(())
    }
}

struct BoundDataset {
    meta: ObfMetadata,
    stream: Box<dyn SeekableReader>,
    session: DecodeSession,
}

/// Reader for OBF files
#[derive(Default)]
pub struct ObfReader {
    bound: Option<BoundDataset>,
}

impl ObfReader {
    pub fn new() -> Self {
        ObfReader { bound: None }
    }

    /// Parses a file and binds to it
    pub fn open(path: &Path) -> FormatResult<Self> {
        let (meta, stream) = ObfParser::new().parse_path(path)?;
        let mut reader = ObfReader::new();
        reader.bind(meta, stream);
        Ok(reader)
    }

    /// Binds parsed metadata and the stream it was parsed from
    pub fn bind(&mut self, meta: ObfMetadata, stream: Box<dyn SeekableReader>) {
        self.bound = Some(BoundDataset {
            meta,
            stream,
            session: DecodeSession::new(),
        });
    }

    /// The full OBF description of the bound file
    pub fn obf_metadata(&self) -> FormatResult<&ObfMetadata> {
        self.bound
            .as_ref()
            .map(|bound| &bound.meta)
            .ok_or_else(|| reader::not_bound(FORMAT_NAME))
    }

    /// Plane currently held by the decode cache, as `(image, plane)`
    pub fn cached_frame(&self) -> Option<(usize, usize)> {
        let session = &self.bound.as_ref()?.session;
        Some((session.image_index?, session.frame_number?))
    }
}

impl PlaneReader for ObfReader {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn metadata(&self) -> FormatResult<&Metadata> {
        Ok(self.obf_metadata()?.metadata())
    }

    fn open_region(
        &mut self,
        image_index: usize,
        plane_index: usize,
        region: Region,
        buf: &mut [u8],
    ) -> FormatResult<()> {
        let BoundDataset {
            ref meta,
            ref mut stream,
            ref mut session,
        } = *self.bound.as_mut().ok_or_else(|| reader::not_bound(FORMAT_NAME))?;

        let image = validation::check_region_request(&meta.core, image_index, plane_index, &region, buf.len())?;
        let stack = meta.stack(image_index).ok_or_else(|| {
            FormatError::IndexOutOfRange(format!("no stack backs image {}", image_index))
        })?;
        let bpp = image.bytes_per_pixel()?;
        let plane_bytes = image.plane_byte_count()?;

        if stack.compressed {
            session.select(image_index, stack, plane_bytes);
            session.advance(stream.as_mut(), plane_index)?;
            reader::copy_region(&session.frame, image.size_x(), bpp, &region, buf)
        } else {
            let plane_offset = stack.position + (plane_index * plane_bytes) as u64;
            reader::read_positional(stream.as_mut(), plane_offset, image.size_x(), bpp, &region, buf)
        }
    }

    fn close(&mut self) {
        if self.bound.take().is_some() {
            debug!("Closed OBF reader");
        }
    }
}
