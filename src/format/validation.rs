//! Shared request validation
//!
//! Every reader and writer checks plane requests through these functions
//! before touching a stream, so the error kinds are identical across formats.

use log::debug;

use crate::format::errors::{FormatError, FormatResult};
use crate::format::region::Region;
use crate::metadata::{ImageMetadata, Metadata};

/// Validates an image index against a dataset
///
/// # Returns
/// The metadata of the requested image
pub fn check_image_index(metadata: &Metadata, image_index: usize) -> FormatResult<&ImageMetadata> {
    metadata.image(image_index)
}

/// Validates a plane index against an image
pub fn check_plane_index(image: &ImageMetadata, plane_index: usize) -> FormatResult<()> {
    let plane_count = image.plane_count();
    if plane_index >= plane_count {
        return Err(FormatError::IndexOutOfRange(format!(
            "plane index {} must be < {}",
            plane_index, plane_count
        )));
    }
    Ok(())
}

/// Validates that a region is non-empty and inside the plane
pub fn check_region(image: &ImageMetadata, region: &Region) -> FormatResult<()> {
    if region.is_empty() || !region.fits_within(image.size_x(), image.size_y()) {
        return Err(FormatError::IndexOutOfRange(format!(
            "region {} is outside the {}x{} plane",
            region,
            image.size_x(),
            image.size_y()
        )));
    }
    Ok(())
}

/// Number of bytes a region occupies, all RGB samples included
pub fn region_byte_count(image: &ImageMetadata, region: &Region) -> FormatResult<usize> {
    Ok(region.area() * image.pixel_stride()?)
}

/// Validates that a buffer can hold a region
///
/// # Arguments
/// * `image` - Metadata of the image the region belongs to
/// * `region` - The requested region
/// * `buffer_len` - Length of the caller's buffer
pub fn check_buffer_size(image: &ImageMetadata, region: &Region, buffer_len: usize) -> FormatResult<()> {
    let required = region_byte_count(image, region)?;
    if buffer_len < required {
        return Err(FormatError::BufferTooSmall {
            required,
            actual: buffer_len,
        });
    }
    Ok(())
}

/// Runs every region request check in order
///
/// # Returns
/// The metadata of the requested image
pub fn check_region_request<'a>(
    metadata: &'a Metadata,
    image_index: usize,
    plane_index: usize,
    region: &Region,
    buffer_len: usize,
) -> FormatResult<&'a ImageMetadata> {
    let image = check_image_index(metadata, image_index)?;
    check_plane_index(image, plane_index)?;
    check_region(image, region)?;
    check_buffer_size(image, region, buffer_len)?;
    debug!(
        "Request for image {} plane {} region {} accepted",
        image_index, plane_index, region
    );
    Ok(image)
}
