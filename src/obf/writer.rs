//! OBF writing
//!
//! Writes file version 1 with one stack per image. Uncompressed files are laid
//! out completely when the destination is bound and regions are written in
//! place; zlib files collect one stream per stack and serialize every record
//! when the writer is closed.

use std::borrow::Cow;
use std::io::{Cursor, Seek, SeekFrom, Write};

use log::debug;

use crate::compression::{PlaneStreamEncoder, StreamKind};
use crate::format::errors::{FormatError, FormatResult};
use crate::format::region::Region;
use crate::format::writer::{self, PlaneWriter, WriterCore, UNCOMPRESSED};
use crate::io::byte_order::{swap_sample_bytes, ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableWriter;
use crate::metadata::{Axis, ImageMetadata, MetaValue, PixelKind};
use crate::obf::constants::{self, compression, header};
use crate::obf::FORMAT_NAME;

/// Compression names accepted by the OBF writer
pub const COMPRESSION_TYPES: [&str; 2] = [UNCOMPRESSED, "zlib"];

/// Everything needed to serialize one stack record
#[derive(Debug, Clone, PartialEq)]
pub struct StackRecord {
    pub name: String,
    pub description: String,
    pub sizes: Vec<usize>,
    pub lengths: Vec<f64>,
    pub offsets: Vec<f64>,
    pub labels: Vec<String>,
    pub kind: PixelKind,
}

fn float_list(value: Option<&MetaValue>, count: usize) -> Option<Vec<f64>> {
    let list = value?.as_list()?;
    if list.len() != count {
        return None;
    }
    list.iter().map(MetaValue::as_f64).collect()
}

fn text_list(value: Option<&MetaValue>, count: usize) -> Option<Vec<String>> {
    let list = value?.as_list()?;
    if list.len() != count {
        return None;
    }
    list.iter().map(|item| item.as_str().map(str::to_string)).collect()
}

impl StackRecord {
    /// Describes an image as a stack
    ///
    /// Trailing axes of length one are left out of the dimension list.
    /// `Lengths`, `Offsets` and `Labels` table entries are reused when they
    /// have one value per written dimension.
    pub fn from_image(image: &ImageMetadata) -> FormatResult<Self> {
        let all_sizes: Vec<usize> = Axis::ALL.iter().map(|axis| image.axis_length(*axis)).collect();
        let dimensions = all_sizes.iter().rposition(|size| *size > 1).map_or(2, |last| (last + 1).max(2));
        let sizes = all_sizes[..dimensions].to_vec();

        let lengths = float_list(image.table.get("Lengths"), dimensions)
            .unwrap_or_else(|| sizes.iter().map(|size| *size as f64).collect());
        let offsets = float_list(image.table.get("Offsets"), dimensions).unwrap_or_else(|| vec![0.0; dimensions]);
        let labels = text_list(image.table.get("Labels"), dimensions)
            .unwrap_or_else(|| Axis::ALL[..dimensions].iter().map(|axis| axis.letter().to_string()).collect());

        let name = image
            .name
            .clone()
            .or_else(|| image.table.get("Name").and_then(MetaValue::as_str).map(str::to_string))
            .unwrap_or_default();
        let description = image
            .table
            .get("Description")
            .and_then(MetaValue::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(StackRecord {
            name,
            description,
            sizes,
            lengths,
            offsets,
            labels,
            kind: image.resolved_pixel_kind()?,
        })
    }

    /// Bytes from the stack magic to the first payload byte
    pub fn header_len(&self) -> u64 {
        header::STACK_HEADER_SIZE + self.name.len() as u64 + self.description.len() as u64
    }

    /// Bytes of the footer following the payload
    pub fn footer_len(&self) -> u64 {
        header::FOOTER_FIXED_SIZE + self.labels.iter().map(|label| 4 + label.len() as u64).sum::<u64>()
    }

    /// Serializes the stack header, name and description
    ///
    /// # Arguments
    /// * `compressed` - Payload is a zlib stream
    /// * `data_length` - Payload length in bytes
    /// * `next` - Position of the following stack, 0 for the last one
    pub fn encode_header(&self, compressed: bool, data_length: u64, next: u64) -> FormatResult<Vec<u8>> {
        let handler = ByteOrder::LittleEndian.create_handler();
        let mut out = Cursor::new(Vec::with_capacity(self.header_len() as usize));
        out.write_all(header::STACK_MAGIC)?;
        handler.write_i16(&mut out, header::MAGIC_NUMBER)?;
        handler.write_i32(&mut out, header::STACK_VERSION)?;
        handler.write_i32(&mut out, self.sizes.len() as i32)?;
        for slot in 0..header::MAX_DIMENSIONS {
            handler.write_i32(&mut out, self.sizes.get(slot).map_or(1, |size| *size as i32))?;
        }
        for slot in 0..header::MAX_DIMENSIONS {
            handler.write_f64(&mut out, self.lengths.get(slot).copied().unwrap_or(0.0))?;
        }
        for slot in 0..header::MAX_DIMENSIONS {
            handler.write_f64(&mut out, self.offsets.get(slot).copied().unwrap_or(0.0))?;
        }
        handler.write_i32(&mut out, constants::pixel_code(self.kind))?;
        handler.write_i32(&mut out, if compressed { compression::ZLIB } else { compression::NONE })?;
        out.write_all(&[0u8; 4])?;
        handler.write_i32(&mut out, self.name.len() as i32)?;
        handler.write_i32(&mut out, self.description.len() as i32)?;
        out.write_all(&[0u8; 8])?;
        handler.write_i64(&mut out, data_length as i64)?;
        handler.write_i64(&mut out, next as i64)?;
        out.write_all(self.name.as_bytes())?;
        out.write_all(self.description.as_bytes())?;
        Ok(out.into_inner())
    }

    /// Serializes the footer: no steps, one label per dimension
    pub fn encode_footer(&self) -> FormatResult<Vec<u8>> {
        let handler = ByteOrder::LittleEndian.create_handler();
        let mut out = Cursor::new(Vec::with_capacity(self.footer_len() as usize));
        handler.write_i32(&mut out, header::FOOTER_FIXED_SIZE as i32)?;
        for _ in 0..2 * header::MAX_DIMENSIONS {
            handler.write_i32(&mut out, 0)?;
        }
        for label in &self.labels {
            write_text(handler.as_ref(), &mut out, label)?;
        }
        Ok(out.into_inner())
    }
}

fn write_text(handler: &dyn ByteOrderHandler, out: &mut dyn SeekableWriter, text: &str) -> FormatResult<()> {
    handler.write_i32(out, text.len() as i32)?;
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Serializes the file header with its description
pub fn encode_file_header(first_stack: u64, description: &str) -> FormatResult<Vec<u8>> {
    let handler = ByteOrder::LittleEndian.create_handler();
    let mut out = Cursor::new(Vec::new());
    out.write_all(header::FILE_MAGIC)?;
    handler.write_i16(&mut out, header::MAGIC_NUMBER)?;
    handler.write_i32(&mut out, header::FILE_VERSION)?;
    handler.write_i64(&mut out, first_stack as i64)?;
    write_text(handler.as_ref(), &mut out, description)?;
    Ok(out.into_inner())
}

/// Payload of one stack while the file is laid out
enum Payload<'a> {
    Zeros(u64),
    Bytes(&'a [u8]),
}

impl Payload<'_> {
    fn len(&self) -> u64 {
        match self {
            Payload::Zeros(count) => *count,
            Payload::Bytes(bytes) => bytes.len() as u64,
        }
    }
}

/// Writes the complete file and returns the payload position of every stack
fn write_layout(
    dest: &mut dyn SeekableWriter,
    description: &str,
    records: &[StackRecord],
    payloads: &[Payload<'_>],
    compressed: bool,
) -> FormatResult<Vec<u64>> {
    let first_stack = header::FILE_HEADER_SIZE + description.len() as u64;
    let mut starts = Vec::with_capacity(records.len());
    let mut position = first_stack;
    for (record, payload) in records.iter().zip(payloads) {
        starts.push(position);
        position += record.header_len() + payload.len() + record.footer_len();
    }

    dest.seek(SeekFrom::Start(0))?;
    let first = if records.is_empty() { 0 } else { first_stack };
    dest.write_all(&encode_file_header(first, description)?)?;

    let mut payload_positions = Vec::with_capacity(records.len());
    for (index, (record, payload)) in records.iter().zip(payloads).enumerate() {
        let next = starts.get(index + 1).copied().unwrap_or(0);
        dest.write_all(&record.encode_header(compressed, payload.len(), next)?)?;
        payload_positions.push(starts[index] + record.header_len());
        match payload {
            Payload::Zeros(count) => writer::write_zeros(dest, *count)?,
            Payload::Bytes(bytes) => dest.write_all(bytes)?,
        }
        dest.write_all(&record.encode_footer()?)?;
    }
    Ok(payload_positions)
}

/// Writer for OBF files
#[derive(Default)]
pub struct ObfWriter {
    core: WriterCore,
    /// Payload position of each stack in uncompressed mode
    payload_positions: Vec<u64>,
    /// One stream per stack in zlib mode
    encoders: Vec<PlaneStreamEncoder>,
}

impl ObfWriter {
    pub fn new() -> Self {
        ObfWriter::default()
    }

    fn file_description(&self) -> FormatResult<String> {
        Ok(self
            .core
            .metadata()?
            .table
            .get("Description")
            .and_then(MetaValue::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

impl PlaneWriter for ObfWriter {
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

    fn pixel_kinds(&self, _compression: &str) -> Vec<PixelKind> {
        PixelKind::ALL.to_vec()
    }

    fn prepare(&mut self) -> FormatResult<()> {
        let zlib = self.core.compression() == "zlib";
        let description = self.file_description()?;
        let (metadata, dest) = self.core.parts()?;

        let mut records = Vec::with_capacity(metadata.image_count());
        let mut plane_sizes = Vec::with_capacity(metadata.image_count());
        for image in &metadata.images {
            if image.rgb_channel_count() > 1 {
                return Err(FormatError::UnsupportedDimensionality(
                    "OBF stacks hold one sample per pixel, RGB images are not supported".to_string(),
                ));
            }
            records.push(StackRecord::from_image(image)?);
            plane_sizes.push((image.plane_byte_count()?, image.plane_count()));
        }

        if zlib {
            self.payload_positions.clear();
            self.encoders = plane_sizes
                .iter()
                .map(|(plane_bytes, planes)| PlaneStreamEncoder::new(StreamKind::Zlib, *plane_bytes, *planes))
                .collect();
            self.core.require_sequential();
            debug!("Collecting zlib streams for {} stacks", records.len());
        } else {
            let payloads: Vec<Payload<'_>> = plane_sizes
                .iter()
                .map(|(plane_bytes, planes)| Payload::Zeros((plane_bytes * planes) as u64))
                .collect();
            self.payload_positions = write_layout(dest, &description, &records, &payloads, false)?;
            self.encoders.clear();
            debug!("Laid out {} uncompressed stacks", records.len());
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

        let (metadata, dest) = self.core.parts()?;
        let image = metadata.image(image_index)?;
        let bpp = image.bytes_per_pixel()?;
        let size_x = image.size_x();
        let used = region.area() * bpp;

        let samples: Cow<'_, [u8]> = if image.little_endian || bpp == 1 {
            Cow::Borrowed(&buf[..used])
        } else {
            let mut swapped = buf[..used].to_vec();
            swap_sample_bytes(&mut swapped, bpp);
            Cow::Owned(swapped)
        };

        match self.encoders.get_mut(image_index) {
            Some(encoder) => {
                let plane = encoder.plane_buffer(plane_index)?;
                writer::paste_region(plane, size_x, bpp, &region, &samples);
            }
            None => {
                let payload = self.payload_positions.get(image_index).copied().ok_or_else(|| {
                    FormatError::NotConfigured(format!("no stack laid out for image {}", image_index))
                })?;
                let plane_offset = payload + (plane_index * image.plane_byte_count()?) as u64;
                writer::write_positional(dest, plane_offset, size_x, bpp, &region, &samples)?;
            }
        }
        self.core.mark_initialized(image_index, plane_index);
        Ok(())
    }

    fn finish(&mut self) -> FormatResult<()> {
        if self.encoders.is_empty() {
            self.payload_positions.clear();
            return Ok(());
        }
        let description = self.file_description()?;
        let streams = self
            .encoders
            .drain(..)
            .map(PlaneStreamEncoder::finish)
            .collect::<FormatResult<Vec<_>>>()?;

        let (metadata, dest) = self.core.parts()?;
        let records = metadata
            .images
            .iter()
            .map(StackRecord::from_image)
            .collect::<FormatResult<Vec<_>>>()?;
        let payloads: Vec<Payload<'_>> = streams.iter().map(|stream| Payload::Bytes(stream.as_slice())).collect();
        write_layout(dest, &description, &records, &payloads, true)?;
        debug!(
            "Wrote {} zlib stacks, {} compressed bytes",
            records.len(),
            streams.iter().map(Vec::len).sum::<usize>()
        );
        Ok(())
    }
}
