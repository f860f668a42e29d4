//! Plane reading
//!
//! Readers serve rectangular regions of individual planes. Every request is
//! validated through [`crate::format::validation`] before any I/O happens.

use std::io::{Read, Seek, SeekFrom};

use crate::format::errors::{FormatError, FormatResult};
use crate::format::region::Region;
use crate::format::validation;
use crate::io::seekable::SeekableReader;
use crate::metadata::Metadata;

/// Region-bounded plane access for one bound dataset
pub trait PlaneReader: Send {
    /// Name of the format being read
    fn format_name(&self) -> &'static str;

    /// Metadata of the bound dataset
    fn metadata(&self) -> FormatResult<&Metadata>;

    /// Copies a region of one plane into `buf`
    ///
    /// # Arguments
    /// * `image_index` - Image within the dataset
    /// * `plane_index` - Plane within the image
    /// * `region` - Rectangle to copy
    /// * `buf` - Destination; must hold at least the region's bytes
    fn open_region(
        &mut self,
        image_index: usize,
        plane_index: usize,
        region: Region,
        buf: &mut [u8],
    ) -> FormatResult<()>;

    /// Releases the stream and every cache; safe to call repeatedly
    fn close(&mut self);

    /// Number of images in the bound dataset
    fn image_count(&self) -> FormatResult<usize> {
        Ok(self.metadata()?.image_count())
    }

    /// Number of planes of one image
    fn plane_count(&self, image_index: usize) -> FormatResult<usize> {
        self.metadata()?.plane_count(image_index)
    }

    /// Reads a region into a freshly allocated buffer
    fn read_region(&mut self, image_index: usize, plane_index: usize, region: Region) -> FormatResult<Vec<u8>> {
        let size = {
            let metadata = self.metadata()?;
            let image = validation::check_image_index(metadata, image_index)?;
            validation::check_plane_index(image, plane_index)?;
            validation::check_region(image, &region)?;
            validation::region_byte_count(image, &region)?
        };
        let mut buf = vec![0u8; size];
        self.open_region(image_index, plane_index, region, &mut buf)?;
        Ok(buf)
    }

    /// Reads a whole plane
    fn read_plane(&mut self, image_index: usize, plane_index: usize) -> FormatResult<Vec<u8>> {
        let region = {
            let image = self.metadata()?.image(image_index)?;
            Region::full(image.size_x(), image.size_y())
        };
        self.read_region(image_index, plane_index, region)
    }
}

/// Error returned by operations on a reader with no bound dataset
pub fn not_bound(format_name: &str) -> FormatError {
    FormatError::NotConfigured(format!("{} reader has no open dataset", format_name))
}

/// Reads a region row by row from an uncompressed plane at a known offset
///
/// # Arguments
/// * `reader` - Stream holding the plane
/// * `plane_offset` - Absolute byte offset of the plane's first pixel
/// * `size_x` - Plane width in pixels
/// * `pixel_bytes` - Bytes per stored pixel
/// * `region` - Rectangle to copy
/// * `buf` - Destination, rows packed back to back
pub fn read_positional(
    reader: &mut dyn SeekableReader,
    plane_offset: u64,
    size_x: usize,
    pixel_bytes: usize,
    region: &Region,
    buf: &mut [u8],
) -> FormatResult<()> {
    let row_bytes = region.width * pixel_bytes;
    for row in 0..region.height {
        let source = plane_offset + (((region.y + row) * size_x + region.x) * pixel_bytes) as u64;
        reader.seek(SeekFrom::Start(source))?;
        reader.read_exact(&mut buf[row * row_bytes..(row + 1) * row_bytes])?;
    }
    Ok(())
}

/// Copies a region out of a decoded plane held in memory
///
/// # Arguments
/// * `plane` - Decoded plane bytes, rows of `size_x` pixels
/// * `size_x` - Plane width in pixels
/// * `pixel_bytes` - Bytes per stored pixel
/// * `region` - Rectangle to copy
/// * `buf` - Destination, rows packed back to back
pub fn copy_region(plane: &[u8], size_x: usize, pixel_bytes: usize, region: &Region, buf: &mut [u8]) -> FormatResult<()> {
    let row_bytes = region.width * pixel_bytes;
    let plane_row_bytes = size_x * pixel_bytes;

    if region.x == 0 && region.width == size_x {
        let start = region.y * plane_row_bytes;
        let length = region.height * row_bytes;
        let source = plane.get(start..start + length).ok_or_else(|| short_plane(plane.len(), start + length))?;
        buf[..length].copy_from_slice(source);
        return Ok(());
    }

    for row in 0..region.height {
        let start = (region.y + row) * plane_row_bytes + region.x * pixel_bytes;
        let source = plane.get(start..start + row_bytes).ok_or_else(|| short_plane(plane.len(), start + row_bytes))?;
        buf[row * row_bytes..(row + 1) * row_bytes].copy_from_slice(source);
    }
    Ok(())
}

fn short_plane(available: usize, needed: usize) -> FormatError {
    FormatError::CorruptData(format!(
        "decoded pixel data holds {} bytes, {} needed",
        available, needed
    ))
}

/// Mirrors the rows of a packed region vertically, in place
///
/// Row r is swapped with row h-1-r through one scratch row.
pub fn flip_rows(buf: &mut [u8], row_bytes: usize, height: usize) {
    let mut scratch = vec![0u8; row_bytes];
    for r in 0..height / 2 {
        let top = r * row_bytes;
        let bottom = (height - r - 1) * row_bytes;
        scratch.copy_from_slice(&buf[top..top + row_bytes]);
        buf.copy_within(bottom..bottom + row_bytes, top);
        buf[bottom..bottom + row_bytes].copy_from_slice(&scratch);
    }
}
