//! Plane writing
//!
//! [`WriterCore`] holds the state every writer shares (metadata, bound
//! destination, per-plane markers, compression choice) and concrete writers
//! compose it. [`PlaneWriter`] supplies the common lifecycle and parameter
//! validation on top of a handful of format hooks.

use std::fs::OpenOptions;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, info};

use crate::format::errors::{FormatError, FormatResult};
use crate::format::region::Region;
use crate::format::validation;
use crate::io::seekable::SeekableWriter;
use crate::metadata::{Metadata, PixelKind};

/// Name of the identity compression every writer accepts
pub const UNCOMPRESSED: &str = "uncompressed";

/// Writer settings applied before a destination is bound
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriterOptions {
    /// Compression name, `None` keeps the writer default
    pub compression: Option<String>,
    /// Planes will be submitted in order
    pub sequential: bool,
}

impl WriterOptions {
    pub fn with_compression(compression: &str) -> Self {
        WriterOptions {
            compression: Some(compression.to_string()),
            sequential: false,
        }
    }
}

/// Pixel kinds a writer accepts unless it says otherwise
pub fn default_pixel_kinds() -> Vec<PixelKind> {
    PixelKind::ALL
        .iter()
        .copied()
        .filter(|kind| *kind != PixelKind::Float64)
        .collect()
}

/// Writes a region row by row into an uncompressed plane at a known offset
///
/// # Arguments
/// * `dest` - Output stream
/// * `plane_offset` - Absolute byte offset of the plane's first pixel
/// * `size_x` - Plane width in pixels
/// * `pixel_bytes` - Bytes per stored pixel
/// * `region` - Rectangle being written
/// * `buf` - Region rows packed back to back
pub fn write_positional(
    dest: &mut dyn SeekableWriter,
    plane_offset: u64,
    size_x: usize,
    pixel_bytes: usize,
    region: &Region,
    buf: &[u8],
) -> FormatResult<()> {
    let row_bytes = region.width * pixel_bytes;
    for row in 0..region.height {
        let target = plane_offset + (((region.y + row) * size_x + region.x) * pixel_bytes) as u64;
        dest.seek(SeekFrom::Start(target))?;
        dest.write_all(&buf[row * row_bytes..(row + 1) * row_bytes])?;
    }
    Ok(())
}

/// Copies a packed region into an in-memory plane
pub fn paste_region(plane: &mut [u8], size_x: usize, pixel_bytes: usize, region: &Region, buf: &[u8]) {
    let row_bytes = region.width * pixel_bytes;
    let plane_row_bytes = size_x * pixel_bytes;
    for row in 0..region.height {
        let start = (region.y + row) * plane_row_bytes + region.x * pixel_bytes;
        plane[start..start + row_bytes].copy_from_slice(&buf[row * row_bytes..(row + 1) * row_bytes]);
    }
}

/// Writes `count` zero bytes at the current position
pub fn write_zeros(dest: &mut dyn SeekableWriter, count: u64) -> FormatResult<()> {
    let chunk = vec![0u8; 64 * 1024];
    let mut remaining = count;
    while remaining > 0 {
        let step = remaining.min(chunk.len() as u64) as usize;
        dest.write_all(&chunk[..step])?;
        remaining -= step as u64;
    }
    Ok(())
}

/// State shared by every writer
pub struct WriterCore {
    metadata: Option<Metadata>,
    dest: Option<Box<dyn SeekableWriter>>,
    /// Per image, per plane: whether any region of the plane was written
    initialized: Vec<Vec<bool>>,
    sequential: bool,
    compression: String,
}

impl Default for WriterCore {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterCore {
    pub fn new() -> Self {
        WriterCore {
            metadata: None,
            dest: None,
            initialized: Vec::new(),
            sequential: false,
            compression: UNCOMPRESSED.to_string(),
        }
    }

    /// The metadata being written
    pub fn metadata(&self) -> FormatResult<&Metadata> {
        self.metadata
            .as_ref()
            .ok_or_else(|| FormatError::NotConfigured("writer has no metadata".to_string()))
    }

    /// Mutable metadata being written
    pub fn metadata_mut(&mut self) -> FormatResult<&mut Metadata> {
        self.metadata
            .as_mut()
            .ok_or_else(|| FormatError::NotConfigured("writer has no metadata".to_string()))
    }

    /// Whether a destination is bound
    pub fn is_bound(&self) -> bool {
        self.dest.is_some()
    }

    /// Metadata and destination together, for writes that need both
    pub fn parts(&mut self) -> FormatResult<(&Metadata, &mut dyn SeekableWriter)> {
        let metadata = self
            .metadata
            .as_ref()
            .ok_or_else(|| FormatError::NotConfigured("writer has no metadata".to_string()))?;
        let dest = self
            .dest
            .as_deref_mut()
            .ok_or_else(|| FormatError::NotConfigured("writer has no destination".to_string()))?;
        Ok((metadata, dest))
    }

    fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = Some(metadata);
    }

    fn bind(&mut self, dest: Box<dyn SeekableWriter>) -> FormatResult<()> {
        let metadata = self.metadata.as_ref().ok_or_else(|| {
            FormatError::NotConfigured("metadata must be set before the destination".to_string())
        })?;
        metadata.validate()?;
        self.initialized = metadata
            .images
            .iter()
            .map(|image| vec![false; image.plane_count()])
            .collect();
        self.dest = Some(dest);
        Ok(())
    }

    fn release(&mut self) -> FormatResult<()> {
        self.initialized.clear();
        if let Some(mut dest) = self.dest.take() {
            dest.flush()?;
        }
        Ok(())
    }

    /// Records that a plane received data
    pub fn mark_initialized(&mut self, image_index: usize, plane_index: usize) {
        if let Some(slot) = self
            .initialized
            .get_mut(image_index)
            .and_then(|planes| planes.get_mut(plane_index))
        {
            *slot = true;
        }
    }

    /// Whether a plane received data since the destination was bound
    pub fn is_initialized(&self, image_index: usize, plane_index: usize) -> bool {
        self.initialized
            .get(image_index)
            .and_then(|planes| planes.get(plane_index))
            .copied()
            .unwrap_or(false)
    }

    /// Selected compression name
    pub fn compression(&self) -> &str {
        &self.compression
    }

    /// Whether planes arrive in order
    pub fn sequential(&self) -> bool {
        self.sequential
    }

    /// Forces sequential mode, used by stream-compressed output
    pub fn require_sequential(&mut self) {
        self.sequential = true;
    }
}

/// Region-bounded plane output for one destination
pub trait PlaneWriter: Send {
    /// Name of the format being written
    fn format_name(&self) -> &'static str;

    /// Shared writer state
    fn core(&self) -> &WriterCore;

    /// Mutable shared writer state
    fn core_mut(&mut self) -> &mut WriterCore;

    /// Compression names this writer accepts
    fn compression_types(&self) -> &'static [&'static str];

    /// Pixel kinds supported with a given compression
    fn pixel_kinds(&self, _compression: &str) -> Vec<PixelKind> {
        default_pixel_kinds()
    }

    /// Lays out the destination after it was bound
    fn prepare(&mut self) -> FormatResult<()>;

    /// Writes a region of one plane
    ///
    /// Implementations call [`PlaneWriter::check_params`] before any output.
    fn write_region(
        &mut self,
        image_index: usize,
        plane_index: usize,
        region: Region,
        buf: &[u8],
    ) -> FormatResult<()>;

    /// Emits whatever the format needs after the last plane
    fn finish(&mut self) -> FormatResult<()>;

    /// Replaces the metadata, closing a bound destination first
    fn set_metadata(&mut self, metadata: Metadata) -> FormatResult<()> {
        self.close()?;
        self.core_mut().set_metadata(metadata);
        Ok(())
    }

    /// The metadata being written
    fn metadata(&self) -> FormatResult<&Metadata> {
        self.core().metadata()
    }

    /// Binds the output stream and lays out the file
    fn set_dest(&mut self, dest: Box<dyn SeekableWriter>) -> FormatResult<()> {
        if self.core().is_bound() {
            self.close()?;
        }
        self.core_mut().bind(dest)?;
        debug!(
            "{} writer bound with {} compression",
            self.format_name(),
            self.core().compression()
        );
        self.prepare()
    }

    /// Creates (or truncates) a file and binds it
    fn set_dest_path(&mut self, path: &Path) -> FormatResult<()> {
        self.core().metadata()?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        if let Some(name) = path.file_name() {
            self.core_mut().metadata_mut()?.dataset_name = Some(name.to_string_lossy().into_owned());
        }
        info!("Writing {} file {}", self.format_name(), path.display());
        self.set_dest(Box::new(BufWriter::new(file)))
    }

    /// Selects one of [`PlaneWriter::compression_types`]
    fn set_compression(&mut self, compression: &str) -> FormatResult<()> {
        if self.core().is_bound() {
            return Err(FormatError::GenericError(
                "compression must be chosen before the destination is bound".to_string(),
            ));
        }
        let selected = self
            .compression_types()
            .iter()
            .find(|name| name.eq_ignore_ascii_case(compression))
            .ok_or_else(|| {
                FormatError::UnsupportedCompression(format!(
                    "{} writer does not support '{}'",
                    self.format_name(),
                    compression
                ))
            })?;
        self.core_mut().compression = selected.to_string();
        Ok(())
    }

    /// Declares that planes will arrive in order
    fn set_write_sequentially(&mut self, sequential: bool) {
        self.core_mut().sequential = sequential;
    }

    /// Applies compression and ordering options
    fn apply_options(&mut self, options: &WriterOptions) -> FormatResult<()> {
        if let Some(compression) = &options.compression {
            self.set_compression(compression)?;
        }
        self.set_write_sequentially(options.sequential);
        Ok(())
    }

    /// Whether a region covers the whole plane
    fn is_full_plane(&self, image_index: usize, region: &Region) -> FormatResult<bool> {
        let image = self.core().metadata()?.image(image_index)?;
        Ok(*region == Region::full(image.size_x(), image.size_y()))
    }

    /// Validates a write request
    ///
    /// Checks, in order: bound metadata and destination, plane index, region
    /// bounds, buffer size, pixel kind support.
    fn check_params(&self, image_index: usize, plane_index: usize, region: &Region, buffer_len: usize) -> FormatResult<()> {
        let core = self.core();
        let metadata = core.metadata()?;
        if !core.is_bound() {
            return Err(FormatError::NotConfigured(format!(
                "{} writer has no destination",
                self.format_name()
            )));
        }
        let image = validation::check_image_index(metadata, image_index)?;
        validation::check_plane_index(image, plane_index)?;
        validation::check_region(image, region)?;
        validation::check_buffer_size(image, region, buffer_len)?;

        let kind = image.resolved_pixel_kind()?;
        if !self.pixel_kinds(core.compression()).contains(&kind) {
            return Err(FormatError::UnsupportedDimensionality(format!(
                "{} writer cannot store {} pixels with {} compression",
                self.format_name(),
                kind,
                core.compression()
            )));
        }
        Ok(())
    }

    /// Writes a whole plane
    fn write_plane(&mut self, image_index: usize, plane_index: usize, buf: &[u8]) -> FormatResult<()> {
        let region = {
            let image = self.core().metadata()?.image(image_index)?;
            Region::full(image.size_x(), image.size_y())
        };
        self.write_region(image_index, plane_index, region, buf)
    }

    /// Finishes the file and releases the destination; safe to call repeatedly
    fn close(&mut self) -> FormatResult<()> {
        if !self.core().is_bound() {
            return Ok(());
        }
        let finished = self.finish();
        let released = self.core_mut().release();
        finished?;
        released
    }
}
