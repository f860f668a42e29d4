//! OBF header parsing
//!
//! Walks the chain of stack records starting at the position stored in the
//! file header. Each stack becomes one image; its payload position, length
//! and compression go into a [`StackDescriptor`].

use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom};

use log::{debug, info};

use crate::format::errors::{FormatError, FormatResult};
use crate::format::parser::{ParseSource, Parser};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::io::stream::StreamExt;
use crate::metadata::{Axis, ImageMetadata, Metadata, MetaValue};
use crate::obf::constants::{self, compression, header};
use crate::obf::metadata::ObfMetadata;
use crate::obf::stack::StackDescriptor;
use crate::obf::FORMAT_NAME;

/// Reads the file magic and version from the start of the stream
///
/// # Returns
/// The file version, or None when the magic does not match
pub fn read_file_version(reader: &mut dyn SeekableReader) -> std::io::Result<Option<i32>> {
    let handler = ByteOrder::LittleEndian.create_handler();
    reader.seek(SeekFrom::Start(0))?;
    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic)?;
    let magic_number = handler.read_i16(reader)?;
    let version = handler.read_i32(reader)?;
    if &magic == header::FILE_MAGIC && magic_number == header::MAGIC_NUMBER {
        Ok(Some(version))
    } else {
        Ok(None)
    }
}

/// Parser for OBF files
#[derive(Debug, Default, Clone, Copy)]
pub struct ObfParser;

impl ObfParser {
    pub fn new() -> Self {
        ObfParser
    }
}

impl Parser for ObfParser {
    type Meta = ObfMetadata;

    fn parse(&self, source: ParseSource) -> FormatResult<(ObfMetadata, Box<dyn SeekableReader>)> {
        let ParseSource { name, mut header, .. } = source;
        let handler = ByteOrder::LittleEndian.create_handler();

        let file_version = match read_file_version(header.as_mut()) {
            Ok(Some(version)) => version,
            Ok(None) | Err(_) => {
                return Err(FormatError::UnsupportedFormat("missing OMAS_BF file magic".to_string()));
            }
        };
        if !(0..=header::FILE_VERSION).contains(&file_version) {
            return Err(FormatError::UnsupportedVersion(file_version as i64));
        }

        let mut meta = ObfMetadata {
            core: Metadata::new(FORMAT_NAME),
            file_version,
            stacks: Vec::new(),
        };
        meta.core.dataset_name = name;

        let first_stack = handler.read_i64(header.as_mut())?;
        let description = read_text(header.as_mut(), handler.as_ref(), "file description")?;
        meta.core.table.put("Description", description);

        let mut visited = HashSet::new();
        let mut position = first_stack;
        while position != 0 {
            if position < 0 || !visited.insert(position) {
                return Err(FormatError::CorruptHeader(format!("stack chain revisits position {}", position)));
            }
            if visited.len() > header::MAX_STACKS {
                return Err(FormatError::CorruptHeader(format!(
                    "more than {} stacks in one file",
                    header::MAX_STACKS
                )));
            }
            let (image, stack, next) = read_stack(header.as_mut(), handler.as_ref(), position as u64, file_version)?;
            debug!(
                "Stack {} at {}: {} ({} bytes{})",
                meta.stacks.len(),
                position,
                image.dimension_order_string(),
                stack.length,
                if stack.compressed { ", zlib" } else { "" }
            );
            meta.core.images.push(image);
            meta.stacks.push(stack);
            position = next;
        }

        meta.core.validate()?;
        info!("Parsed OBF file version {} with {} stacks", file_version, meta.stacks.len());
        Ok((meta, header))
    }
}

fn read_length(reader: &mut dyn SeekableReader, handler: &dyn ByteOrderHandler, what: &str) -> FormatResult<usize> {
    let length = handler.read_i32(reader)?;
    usize::try_from(length).map_err(|_| FormatError::CorruptHeader(format!("negative {} length {}", what, length)))
}

/// Reads `length` bytes of text, refusing lengths past the end of the file
fn read_bounded_text(reader: &mut dyn SeekableReader, length: usize, what: &str) -> FormatResult<String> {
    let remaining = reader.length()?.saturating_sub(reader.current_position()?);
    if length as u64 > remaining {
        return Err(FormatError::CorruptHeader(format!(
            "{} length {} exceeds the {} bytes left in the file",
            what, length, remaining
        )));
    }
    Ok(reader.read_string(length)?)
}

/// Reads an i32 length followed by that many bytes of text
fn read_text(reader: &mut dyn SeekableReader, handler: &dyn ByteOrderHandler, what: &str) -> FormatResult<String> {
    let length = read_length(reader, handler, what)?;
    read_bounded_text(reader, length, what)
}

fn read_i32_slots(reader: &mut dyn SeekableReader, handler: &dyn ByteOrderHandler) -> FormatResult<Vec<i32>> {
    (0..header::MAX_DIMENSIONS)
        .map(|_| handler.read_i32(reader).map_err(FormatError::from))
        .collect()
}

fn read_f64_slots(reader: &mut dyn SeekableReader, handler: &dyn ByteOrderHandler) -> FormatResult<Vec<f64>> {
    (0..header::MAX_DIMENSIONS)
        .map(|_| handler.read_f64(reader).map_err(FormatError::from))
        .collect()
}

/// Reads the stack record at `position`
///
/// # Returns
/// The image description, the payload descriptor and the next stack position
fn read_stack(
    reader: &mut dyn SeekableReader,
    handler: &dyn ByteOrderHandler,
    position: u64,
    file_version: i32,
) -> FormatResult<(ImageMetadata, StackDescriptor, i64)> {
    reader.seek(SeekFrom::Start(position))?;
    let mut magic = [0u8; 14];
    reader.read_exact(&mut magic)?;
    let magic_number = handler.read_i16(reader)?;
    let version = handler.read_i32(reader)?;
    if &magic != header::STACK_MAGIC || magic_number != header::MAGIC_NUMBER || version > header::STACK_VERSION {
        return Err(FormatError::CorruptHeader(format!(
            "unsupported stack record (version {}) at {}",
            version, position
        )));
    }

    let dimension_count = handler.read_i32(reader)?;
    let dimensions = usize::try_from(dimension_count)
        .map_err(|_| FormatError::CorruptHeader(format!("negative dimension count {}", dimension_count)))?;
    if dimensions > header::SUPPORTED_DIMENSIONS {
        return Err(FormatError::UnsupportedDimensionality(format!(
            "{} dimensions, at most {} are supported",
            dimensions,
            header::SUPPORTED_DIMENSIONS
        )));
    }

    let raw_sizes = read_i32_slots(reader, handler)?;
    let mut sizes = [1usize; header::SUPPORTED_DIMENSIONS];
    for (slot, size) in sizes.iter_mut().zip(raw_sizes.iter()).take(dimensions) {
        *slot = usize::try_from(*size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| FormatError::CorruptHeader(format!("stack at {} has axis size {}", position, size)))?;
    }

    let mut image = ImageMetadata::new();
    for (axis, size) in Axis::ALL.iter().zip(sizes.iter()) {
        image.set_axis_length(*axis, *size);
    }
    image.dimension_order = Axis::ALL.to_vec();
    image.little_endian = true;
    image.rgb = false;
    image.interleaved = false;
    image.indexed = false;
    image.thumbnail = false;
    image.order_certain = false;
    image.metadata_complete = true;

    let lengths = read_f64_slots(reader, handler)?;
    image.table.put("Lengths", lengths[..dimensions].to_vec());
    let offsets = read_f64_slots(reader, handler)?;
    image.table.put("Offsets", offsets[..dimensions].to_vec());

    let type_code = handler.read_i32(reader)?;
    image.pixel_kind = Some(constants::pixel_kind_from_code(type_code).ok_or_else(|| {
        FormatError::UnsupportedDimensionality(format!("unsupported pixel type 0x{:x}", type_code))
    })?);

    let compressed = match handler.read_i32(reader)? {
        compression::NONE => false,
        compression::ZLIB => true,
        other => {
            return Err(FormatError::UnsupportedCompression(format!("stack compression code {}", other)));
        }
    };

    reader.skip_bytes(4)?;
    let name_length = read_length(reader, handler, "stack name")?;
    let description_length = read_length(reader, handler, "stack description")?;
    reader.skip_bytes(8)?;

    let data_length = handler.read_i64(reader)?;
    let data_length = u64::try_from(data_length)
        .map_err(|_| FormatError::CorruptHeader(format!("negative stack length {} on disk", data_length)))?;
    let next = handler.read_i64(reader)?;

    let name = read_bounded_text(reader, name_length, "stack name")?;
    let description = read_bounded_text(reader, description_length, "stack description")?;
    if !name.is_empty() {
        image.name = Some(name.clone());
    }
    image.table.put("Name", name);
    image.table.put("Description", description);

    let stack = StackDescriptor::new(reader.current_position()?, data_length, compressed);

    if file_version >= 1 {
        read_footer(reader, handler, &stack, &sizes[..dimensions], &mut image)?;
    }
    Ok((image, stack, next))
}

/// Reads the per-dimension labels, steps and step labels after the payload
fn read_footer(
    reader: &mut dyn SeekableReader,
    handler: &dyn ByteOrderHandler,
    stack: &StackDescriptor,
    sizes: &[usize],
    image: &mut ImageMetadata,
) -> FormatResult<()> {
    let dimensions = sizes.len();
    let footer = stack.end();
    reader.seek(SeekFrom::Start(footer))?;
    let footer_size = handler.read_i32(reader)?;
    let steps_present: Vec<bool> = read_i32_slots(reader, handler)?.iter().map(|flag| *flag != 0).collect();
    let labels_present: Vec<bool> = read_i32_slots(reader, handler)?.iter().map(|flag| *flag != 0).collect();

    let label_area = u64::try_from(footer_size)
        .map_err(|_| FormatError::CorruptHeader(format!("negative footer size {}", footer_size)))?;
    reader.seek(SeekFrom::Start(footer + label_area))?;

    let mut labels = Vec::with_capacity(dimensions);
    for _ in 0..dimensions {
        labels.push(MetaValue::from(read_text(reader, handler, "dimension label")?));
    }
    image.table.put("Labels", MetaValue::List(labels));

    let mut steps = Vec::with_capacity(dimensions);
    for dimension in 0..dimensions {
        let mut list = Vec::new();
        if steps_present[dimension] {
            for _ in 0..sizes[dimension] {
                list.push(MetaValue::Float(handler.read_f64(reader)?));
            }
        }
        steps.push(MetaValue::List(list));
    }
    image.table.put("Steps", MetaValue::List(steps));

    let mut step_labels = Vec::with_capacity(dimensions);
    for dimension in 0..dimensions {
        let mut list = Vec::new();
        if labels_present[dimension] {
            for _ in 0..sizes[dimension] {
                list.push(MetaValue::from(read_text(reader, handler, "step label")?));
            }
        }
        step_labels.push(MetaValue::List(list));
    }
    image.table.put("StepLabels", MetaValue::List(step_labels));
    Ok(())
}
