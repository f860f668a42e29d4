//! ICS writing
//!
//! Produces self-contained version 2.0 files: the text header is followed by
//! the pixel payload, raw or as one gzip stream. A gzip stream that does not
//! shrink the pixels is replaced by the raw samples.

use std::io::{Seek, SeekFrom, Write};

use log::{debug, warn};

use crate::compression::{CompressionHandler, GzipHandler, PlaneStreamEncoder, StreamKind};
use crate::format::errors::{FormatError, FormatResult};
use crate::format::region::Region;
use crate::format::writer::{self, PlaneWriter, WriterCore, UNCOMPRESSED};
use crate::ics::parser::is_smaller_than_raw;
use crate::ics::FORMAT_NAME;
use crate::io::seekable::SeekableWriter;
use crate::metadata::{ImageMetadata, MetaValue, PixelKind};

/// Compression names accepted by the ICS writer
pub const COMPRESSION_TYPES: [&str; 2] = [UNCOMPRESSED, "gzip"];

/// Writer for self-contained ICS files
#[derive(Default)]
pub struct IcsWriter {
    core: WriterCore,
    /// Offset of the first pixel byte
    pixel_offset: u64,
    encoder: Option<PlaneStreamEncoder>,
}

impl IcsWriter {
    pub fn new() -> Self {
        IcsWriter::default()
    }
}

/// Byte order tokens that the parser resolves back to `little_endian`
///
/// The parser reads the first token `f` as little endian when
/// `(real ? f == 1 : f != 1)`, inverted for depths below 32 bits.
pub fn byte_order_tokens(kind: PixelKind, little_endian: bool) -> String {
    let bytes = kind.bytes_per_pixel();
    let base = if kind.bits_per_pixel() < 32 { !little_endian } else { little_endian };
    let first_is_one = if kind.is_floating_point() { base } else { !base };
    let tokens: Vec<String> = if first_is_one {
        (1..=bytes).map(|b| b.to_string()).collect()
    } else {
        (1..=bytes).rev().map(|b| b.to_string()).collect()
    };
    tokens.join("\t")
}

/// Builds the text header for one image
///
/// # Arguments
/// * `image` - The image being written
/// * `compression` - Compression tag to record
pub fn build_header(image: &ImageMetadata, compression: &str) -> FormatResult<String> {
    let kind = image.resolved_pixel_kind()?;
    let bits = kind.bits_per_pixel();

    let (order, sizes): (Vec<&str>, Vec<usize>) = if image.is_rgb() {
        (
            vec!["bits", "ch", "x", "y", "z", "t"],
            vec![bits as usize, image.size_c(), image.size_x(), image.size_y(), image.size_z(), image.size_t()],
        )
    } else {
        (
            vec!["bits", "x", "y", "z", "ch", "t"],
            vec![bits as usize, image.size_x(), image.size_y(), image.size_z(), image.size_c(), image.size_t()],
        )
    };
    let sizes: Vec<String> = sizes.iter().map(|s| s.to_string()).collect();

    let scale = match image.table.get("parameter scale").and_then(MetaValue::as_str) {
        Some(existing) if existing.split_whitespace().count() == order.len() => {
            existing.split_whitespace().collect::<Vec<_>>().join("\t")
        }
        _ => vec!["1.000000"; order.len()].join("\t"),
    };

    let mut header = String::new();
    header.push_str("\t\n");
    header.push_str("ics_version\t2.0\n");
    if let Some(name) = &image.name {
        header.push_str(&format!("filename\t{}\n", name));
    }
    header.push_str(&format!("layout\tparameters\t{}\n", order.len()));
    header.push_str(&format!("layout\torder\t{}\n", order.join("\t")));
    header.push_str(&format!("layout\tsizes\t{}\n", sizes.join("\t")));
    header.push_str("layout\tcoordinates\tvideo\n");
    header.push_str(&format!("layout\tsignificant_bits\t{}\n", bits));
    header.push_str(&format!(
        "representation\tformat\t{}\n",
        if kind.is_floating_point() { "real" } else { "integer" }
    ));
    header.push_str(&format!(
        "representation\tsign\t{}\n",
        if kind.is_signed() { "signed" } else { "unsigned" }
    ));
    header.push_str(&format!("representation\tcompression\t{}\n", compression));
    header.push_str(&format!(
        "representation\tbyte_order\t{}\n",
        byte_order_tokens(kind, image.little_endian)
    ));
    header.push_str(&format!("parameter\tscale\t{}\n", scale));
    header.push_str("end\n");
    Ok(header)
}

/// Writes the header at the start of the destination
///
/// # Returns
/// The offset of the first pixel byte
fn write_header(dest: &mut dyn SeekableWriter, image: &ImageMetadata, compression: &str) -> FormatResult<u64> {
    let header = build_header(image, compression)?;
    dest.seek(SeekFrom::Start(0))?;
    dest.write_all(header.as_bytes())?;
    debug!("Wrote {} byte ICS header", header.len());
    Ok(header.len() as u64)
}

impl PlaneWriter for IcsWriter {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn core(&self) -> &WriterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WriterCore {
        &mut self.core
    }

    fn compression_types(&self) -> &'static [&'static str] {
        &COMPRESSION_TYPES
    }

    fn prepare(&mut self) -> FormatResult<()> {
        let gzip = self.core.compression() == "gzip";
        let (metadata, dest) = self.core.parts()?;
        if metadata.image_count() != 1 {
            return Err(FormatError::UnsupportedDimensionality(format!(
                "ICS files hold exactly one image, got {}",
                metadata.image_count()
            )));
        }
        let image = metadata.image(0)?;
        let plane_bytes = image.plane_byte_count()?;
        let plane_count = image.plane_count();

        if gzip {
            // The header is written on close, once the payload size is known
            self.encoder = Some(PlaneStreamEncoder::new(StreamKind::Gzip, plane_bytes, plane_count));
            self.core.require_sequential();
        } else {
            self.encoder = None;
            self.pixel_offset = write_header(dest, image, UNCOMPRESSED)?;
            writer::write_zeros(dest, (plane_bytes * plane_count) as u64)?;
        }
        Ok(())
    }

    fn write_region(
        &mut self,
        image_index: usize,
        plane_index: usize,
        region: Region,
        buf: &[u8],
    ) -> FormatResult<()> {
        self.check_params(image_index, plane_index, &region, buf.len())?;

        let pixel_offset = self.pixel_offset;
        let (metadata, dest) = self.core.parts()?;
        let image = metadata.image(image_index)?;
        let pixel = image.pixel_stride()?;
        let size_x = image.size_x();

        match self.encoder.as_mut() {
            Some(encoder) => {
                let plane = encoder.plane_buffer(plane_index)?;
                writer::paste_region(plane, size_x, pixel, &region, buf);
            }
            None => {
                let plane_offset = pixel_offset + (plane_index * image.plane_byte_count()?) as u64;
                writer::write_positional(dest, plane_offset, size_x, pixel, &region, buf)?;
            }
        }
        self.core.mark_initialized(image_index, plane_index);
        Ok(())
    }

    fn finish(&mut self) -> FormatResult<()> {
        if let Some(encoder) = self.encoder.take() {
            let packed = encoder.finish()?;
            let (metadata, dest) = self.core.parts()?;
            let image = metadata.image(0)?;
            let bits = image.resolved_pixel_kind()?.bits_per_pixel();

            // Readers only inflate payloads smaller than the raw samples
            let (compression, payload) = if is_smaller_than_raw(packed.len() as u64, image, bits) {
                ("gzip", packed)
            } else {
                warn!(
                    "gzip stream of {} bytes is not smaller than the raw pixels, storing them uncompressed",
                    packed.len()
                );
                (UNCOMPRESSED, GzipHandler.decompress(&packed)?)
            };

            self.pixel_offset = write_header(dest, image, compression)?;
            dest.write_all(&payload)?;
            debug!("Wrote {} bytes of {} pixel data", payload.len(), compression);
        }
        Ok(())
    }
}
