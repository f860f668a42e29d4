//! ICS header parsing
//!
//! Reads the text header line by line, keeps every key/value pair in the
//! image table and resolves the structural fields (layout, representation)
//! plus the acquisition annotations.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::format::errors::{FormatError, FormatResult};
use crate::format::parser::{open_stream, ParseSource, Parser};
use crate::ics::companion::{self, VERSION_PREFIX_LENGTH};
use crate::ics::metadata::{IcsAnnotations, IcsMetadata};
use crate::ics::tokenizer::{classify, tokenize};
use crate::ics::FORMAT_NAME;
use crate::io::seekable::SeekableReader;
use crate::io::stream::StreamExt;
use crate::metadata::{Axis, ImageMetadata, Metadata, PixelKind};
use crate::utils::date_utils;
use crate::utils::string_utils::{parse_truncated, whitespace_tokens};

/// Layouts tried, in order, for `history date` values
pub const HISTORY_DATE_FORMATS: [&str; 4] = [
    "%A, %B %d, %Y %H:%M:%S",
    "%a %d %B %Y %H:%M:%S",
    "%a %b %d %H:%M:%S %Y",
    "%a %d %b %Y %H:%M:%S",
];

/// Layout of `history created on` values
pub const CREATED_ON_FORMAT: &str = "%H:%M:%S %d-%m-%Y";

lazy_static! {
    static ref GAIN_KEY: Regex = Regex::new(r"^history gain ?(\d+)?$").unwrap();
    static ref LASER_WAVELENGTH_KEY: Regex = Regex::new(r"^history laser ?(\d+) wavelength$").unwrap();
    static ref STEP_NAME_KEY: Regex = Regex::new(r"^history step ?(\d+) name$").unwrap();
}

/// Structural header fields collected before the image is resolved
#[derive(Debug, Default)]
struct HeaderFields {
    layout_sizes: Option<String>,
    layout_order: Option<String>,
    significant_bits: Option<String>,
    byte_order: Option<String>,
    format: Option<String>,
    compression: Option<String>,
    scale: Option<String>,
    signed: bool,
    emission: Option<String>,
    excitation: Option<String>,
    labels: Option<String>,
    lengths: Option<String>,
    extents: Option<String>,
    image_name: Option<String>,
    invert_y: bool,
}

/// Parser for ICS headers
#[derive(Debug, Default, Clone, Copy)]
pub struct IcsParser;

impl IcsParser {
    pub fn new() -> Self {
        IcsParser
    }
}

impl Parser for IcsParser {
    type Meta = IcsMetadata;

    fn parse(&self, source: ParseSource) -> FormatResult<(IcsMetadata, Box<dyn SeekableReader>)> {
        let ParseSource {
            name,
            mut header,
            data,
            modified,
        } = source;

        header.seek(SeekFrom::Start(0))?;
        let mut prefix = Vec::with_capacity(VERSION_PREFIX_LENGTH);
        header.by_ref().take(VERSION_PREFIX_LENGTH as u64).read_to_end(&mut prefix)?;
        let version_two = companion::is_version_two_prefix(&prefix);
        header.seek(SeekFrom::Start(0))?;

        let mut meta = IcsMetadata {
            core: Metadata::new(FORMAT_NAME),
            version_two,
            ..Default::default()
        };
        meta.core.dataset_name = name.clone();

        let mut image = ImageMetadata::new();
        let mut fields = HeaderFields::default();
        let reached_end = read_header(header.as_mut(), &mut image, &mut fields, &mut meta.annotations)?;

        let mut pixels = if version_two {
            if !reached_end {
                skip_to_end_line(header.as_mut())?;
            }
            header
        } else {
            match data {
                Some(mut data) => {
                    data.seek(SeekFrom::Start(0))?;
                    data
                }
                None => {
                    let header_name = name.unwrap_or_else(|| "dataset.ics".to_string());
                    let (_, data_path) = companion::companion_names(Path::new(&header_name));
                    return Err(FormatError::MissingCompanionFile(data_path));
                }
            }
        };
        meta.pixel_offset = pixels.current_position()?;

        resolve_image(&mut meta, &mut image, &fields)?;

        if meta.annotations.creation_date.is_none() {
            let date = match modified {
                Some(time) => date_utils::system_time_to_iso8601(time),
                None => date_utils::now_iso8601(),
            };
            debug!("Using default creation date {}", date);
            meta.annotations.creation_date = Some(date);
        }

        image.name = fields.image_name.clone().or_else(|| meta.core.dataset_name.clone());
        meta.core.images.push(image);

        meta.core.validate()?;
        load_compressed_payload(&mut meta, pixels.as_mut(), &fields)?;

        info!(
            "Parsed ICS header: {} planes of {}x{} ({})",
            meta.core.images[0].plane_count(),
            meta.core.images[0].size_x(),
            meta.core.images[0].size_y(),
            if meta.version_two { "version 2.0" } else { "version 1" }
        );
        Ok((meta, pixels))
    }

    fn parse_path(&self, path: &Path) -> FormatResult<(IcsMetadata, Box<dyn SeekableReader>)> {
        let files = companion::resolve(path)?;
        let mut source = ParseSource::open(&files.header)?;
        if let Some(data) = &files.data {
            source = source.with_data(open_stream(data)?);
        }

        let (mut meta, pixels) = self.parse(source)?;
        meta.header_path = Some(files.header.clone());
        meta.data_path = files.data.clone();
        Ok((meta, pixels))
    }
}

/// Reads header lines until `end`, an empty line or end of stream
///
/// # Returns
/// True when the `end` line was consumed
fn read_header(
    reader: &mut dyn SeekableReader,
    image: &mut ImageMetadata,
    fields: &mut HeaderFields,
    annotations: &mut IcsAnnotations,
) -> FormatResult<bool> {
    // separator line
    if reader.read_text_line()?.is_none() {
        return Err(FormatError::CorruptHeader("ICS header is empty".to_string()));
    }

    let mut history = String::new();
    let mut first = true;
    let mut reached_end = false;
    while let Some(line) = reader.read_text_line()? {
        let trimmed = line.trim();
        if trimmed == "end" {
            reached_end = true;
            break;
        }
        if trimmed.is_empty() && !first {
            break;
        }
        first = false;

        let tokens = tokenize(&line);
        let (key, value) = match classify(&tokens) {
            Some(pair) => pair,
            None => continue,
        };
        image.table.put(&key, value.as_str());
        apply_field(&key, &value, image, fields, annotations, &mut history);
    }

    image.table.put("history text", history.as_str());
    annotations.history = history;
    Ok(reached_end)
}

/// Advances a self-contained file past its `end` line
fn skip_to_end_line(reader: &mut dyn SeekableReader) -> FormatResult<()> {
    while let Some(line) = reader.read_text_line()? {
        if line.trim() == "end" {
            return Ok(());
        }
    }
    Err(FormatError::CorruptHeader("ICS header has no end line".to_string()))
}

fn parse_f64(key: &str, text: &str) -> Option<f64> {
    match text.trim().parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring non-numeric value '{}' for {}", text, key);
            None
        }
    }
}

fn capture_index(regex: &Regex, key: &str) -> Option<Option<usize>> {
    regex
        .captures(key)
        .map(|captures| captures.get(1).and_then(|m| m.as_str().parse::<usize>().ok()))
}

/// Records one key/value pair in the structural fields or annotations
fn apply_field(
    key: &str,
    value: &str,
    image: &mut ImageMetadata,
    fields: &mut HeaderFields,
    annotations: &mut IcsAnnotations,
    history: &mut String,
) {
    let normalized = key.to_lowercase();
    match normalized.as_str() {
        "layout sizes" => fields.layout_sizes = Some(value.to_string()),
        "layout order" => fields.layout_order = Some(value.to_string()),
        "layout significant_bits" => fields.significant_bits = Some(value.to_string()),
        "representation byte_order" => fields.byte_order = Some(value.to_string()),
        "representation format" => fields.format = Some(value.to_string()),
        "representation compression" => fields.compression = Some(value.to_string()),
        "representation sign" => fields.signed = value == "signed",
        "parameter scale" => fields.scale = Some(value.to_string()),
        "sensor s_params lambdaem" => fields.emission = Some(value.to_string()),
        "sensor s_params lambdaex" => fields.excitation = Some(value.to_string()),
        "history extents" => fields.extents = Some(value.to_string()),
        "history lengths" => fields.lengths = Some(value.to_string()),
        "history labels" => fields.labels = Some(value.to_string()),
        "filename" => fields.image_name = Some(value.to_string()),
        "history" | "history text" => {
            history.push_str(value);
            history.push('\n');
            image.table.remove(key);
        }
        "history software" => {
            if value.contains("SVI") {
                debug!("Header written by SVI software, rows are stored bottom-up");
                fields.invert_y = true;
            }
            annotations.software = Some(value.to_string());
        }
        "history date" => {
            if let Some(space) = value.rfind(' ') {
                let date = &value[..space];
                match date_utils::parse_first(date, &HISTORY_DATE_FORMATS) {
                    Some(parsed) => annotations.creation_date = Some(date_utils::to_iso8601(&parsed)),
                    None => warn!("Unrecognized history date '{}', using default creation date", date),
                }
            }
        }
        "history created on" => match date_utils::parse_first(value, &[CREATED_ON_FORMAT]) {
            Some(parsed) => annotations.creation_date = Some(date_utils::to_iso8601(&parsed)),
            None => warn!("Unrecognized creation date '{}'", value),
        },
        "history objective" => annotations.objective_model = Some(value.to_string()),
        "history objective immersion" => annotations.objective_immersion = Some(value.to_string()),
        "history objective na" => annotations.objective_na = parse_f64(key, value),
        "history objective workingdistance" => annotations.objective_working_distance = parse_f64(key, value),
        "history objective magnification" => {
            annotations.objective_magnification = parse_truncated(value);
        }
        "sensor s_params pinholeradius" => {
            annotations.pinhole_sizes = whitespace_tokens(value)
                .into_iter()
                .filter_map(|token| parse_f64(key, token))
                .collect();
        }
        "history author" => annotations.author = Some(value.to_string()),
        "history stage_xyzum" => {
            annotations.stage_position = whitespace_tokens(value)
                .into_iter()
                .take(3)
                .filter_map(|token| parse_f64(key, token))
                .collect();
        }
        "history other text" => annotations.description = Some(value.to_string()),
        _ => apply_indexed_field(key, value, annotations),
    }
}

/// Handles keys that embed a channel, laser or detector number
fn apply_indexed_field(key: &str, value: &str, annotations: &mut IcsAnnotations) {
    if let Some(index) = capture_index(&GAIN_KEY, key) {
        if let Some(gain) = parse_f64(key, value) {
            annotations.detector_gains.insert(index.unwrap_or(0), gain);
        }
    } else if let Some(index) = capture_index(&LASER_WAVELENGTH_KEY, key) {
        let stripped = value.replace("nm", "");
        match (index, parse_truncated(&stripped)) {
            (Some(laser), Some(wavelength)) => {
                annotations.laser_wavelengths.insert(laser, wavelength);
            }
            _ => warn!("Ignoring laser wavelength '{}' for {}", value, key),
        }
    } else if let Some(Some(channel)) = capture_index(&STEP_NAME_KEY, key) {
        annotations.channel_names.insert(channel, value.to_string());
    }
}

fn parse_size(token: &str) -> FormatResult<usize> {
    token
        .parse::<usize>()
        .map_err(|_| FormatError::CorruptHeader(format!("layout size '{}' is not a number", token)))
}

/// Resolves geometry, pixel kind and byte order from the collected fields
fn resolve_image(meta: &mut IcsMetadata, image: &mut ImageMetadata, fields: &HeaderFields) -> FormatResult<()> {
    let order = fields
        .layout_order
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| FormatError::CorruptHeader("missing 'layout order'".to_string()))?;
    let sizes = fields
        .layout_sizes
        .as_deref()
        .ok_or_else(|| FormatError::CorruptHeader("missing 'layout sizes'".to_string()))?;
    let format = fields
        .format
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| FormatError::CorruptHeader("missing 'representation format'".to_string()))?;

    let channels_first = match (order.find("ch"), order.find('x')) {
        (Some(channel), Some(x)) => channel < x,
        _ => false,
    };
    meta.channels_interleaved = channels_first;
    let mut rgb = channels_first;

    let mut bits: Option<u32> = None;
    let mut dimension_order = vec![Axis::X, Axis::Y];
    for (size_token, order_token) in whitespace_tokens(sizes).into_iter().zip(whitespace_tokens(order)) {
        let size = parse_size(size_token)?;
        let axis = match order_token {
            "bits" => {
                bits = Some(size as u32);
                continue;
            }
            "x" => Axis::X,
            "y" => Axis::Y,
            "z" => Axis::Z,
            "ch" => {
                if size > 4 {
                    rgb = false;
                }
                Axis::Channel
            }
            _ => Axis::Time,
        };
        image.set_axis_length(axis, size);
        if !dimension_order.contains(&axis) {
            dimension_order.push(axis);
        }
    }
    for axis in [Axis::Z, Axis::Time, Axis::Channel] {
        if !dimension_order.contains(&axis) {
            dimension_order.push(axis);
        }
        if image.axis_length(axis) == 0 {
            image.set_axis_length(axis, 1);
        }
    }
    image.dimension_order = dimension_order;

    let bits = match bits {
        Some(bits) => bits,
        None => fields
            .significant_bits
            .as_deref()
            .and_then(|text| whitespace_tokens(text).first().and_then(|t| t.parse::<u32>().ok()))
            .ok_or_else(|| FormatError::CorruptHeader("no bit depth in layout".to_string()))?,
    };
    meta.bits_per_pixel = bits;

    resolve_physical_sizes(image, fields, order, &mut meta.annotations);

    image.rgb = rgb && image.size_c() > 1;
    image.interleaved = image.rgb;
    image.indexed = false;
    image.false_color = false;
    image.thumbnail = false;
    image.metadata_complete = true;
    image.order_certain = true;

    let real = format == "real";
    let mut little_endian = true;
    if let Some(byte_order) = fields.byte_order.as_deref() {
        let first = whitespace_tokens(byte_order)
            .first()
            .and_then(|token| token.parse::<i64>().ok())
            .ok_or_else(|| FormatError::CorruptHeader(format!("byte order '{}' is not numeric", byte_order)))?;
        little_endian = if real { first == 1 } else { first != 1 };
    }
    if bits < 32 {
        little_endian = !little_endian;
    }
    image.little_endian = little_endian;

    image.pixel_kind = Some(resolve_pixel_kind(format, bits, fields.signed)?);

    meta.invert_y = fields.invert_y;

    let channel_count = image.size_c();
    meta.annotations.emission_wavelengths = per_channel(fields.emission.as_deref(), channel_count);
    meta.annotations.excitation_wavelengths = per_channel(fields.excitation.as_deref(), channel_count);
    Ok(())
}

/// Maps the representation format and bit depth to a pixel kind
///
/// Integer depths are rounded up to whole bytes and 24/48 bit samples are
/// treated as three 8/16 bit channels.
pub fn resolve_pixel_kind(format: &str, bits: u32, signed: bool) -> FormatResult<PixelKind> {
    let kind = match format {
        "real" => match bits {
            32 | 64 => PixelKind::from_bits(bits, true, true),
            _ => None,
        },
        "integer" => {
            let mut rounded = bits.div_ceil(8) * 8;
            if rounded == 24 || rounded == 48 {
                rounded /= 3;
            }
            PixelKind::from_bits(rounded, signed, false)
        }
        _ => None,
    };
    kind.ok_or_else(|| {
        FormatError::UnsupportedDimensionality(format!("{} pixels of {} bits", format, bits))
    })
}

fn per_channel(values: Option<&str>, channel_count: usize) -> Vec<i64> {
    let mut result = vec![0i64; channel_count];
    if let Some(values) = values {
        for (slot, token) in result.iter_mut().zip(whitespace_tokens(values)) {
            *slot = parse_truncated(token).unwrap_or(0);
        }
    }
    result
}

/// Physical sizes from `parameter scale` and `history labels`
fn resolve_physical_sizes(image: &ImageMetadata, fields: &HeaderFields, order: &str, annotations: &mut IcsAnnotations) {
    if let Some(scale) = fields.scale.as_deref() {
        for (axis, size) in whitespace_tokens(order).into_iter().zip(whitespace_tokens(scale)) {
            let value = match parse_f64("parameter scale", size) {
                Some(value) => value,
                None => continue,
            };
            match axis.to_lowercase().as_str() {
                "x" => annotations.physical_size_x = Some(value),
                "y" => annotations.physical_size_y = Some(value),
                "z" => annotations.physical_size_z = Some(value),
                "t" => annotations.time_increment = Some(value),
                "ch" => annotations.wave_increment = Some(value.trunc() as i64),
                _ => {}
            }
        }
    }

    let labels = match fields.labels.as_deref() {
        Some(labels) => whitespace_tokens(labels),
        None => return,
    };
    let lengths = fields.lengths.as_deref().map(whitespace_tokens);
    let extents = fields.extents.as_deref().map(whitespace_tokens);
    if lengths.is_none() && extents.is_none() {
        return;
    }

    for (i, label) in labels.iter().enumerate() {
        let size_text = lengths
            .as_ref()
            .and_then(|l| l.get(i))
            .or_else(|| extents.as_ref().and_then(|e| e.get(i)));
        let size = match size_text.and_then(|text| parse_f64("history lengths", text)) {
            Some(size) => size,
            None => continue,
        };
        match label.to_lowercase().as_str() {
            "x" => annotations.physical_size_x = Some(size / image.size_x() as f64),
            "y" => annotations.physical_size_y = Some(size / image.size_y() as f64),
            "z" => annotations.physical_size_z = Some(size / image.size_z() as f64),
            "t" => annotations.time_increment = Some(size / image.size_t() as f64),
            "c" => annotations.wave_increment = Some((size / image.size_c() as f64).trunc() as i64),
            _ => {}
        }
    }
}

/// Whether a payload tagged as compressed is smaller per plane than raw samples
///
/// # Arguments
/// * `payload_len` - Bytes of pixel data after the header
/// * `image` - Validated geometry of the single image
/// * `bits` - Declared bits per sample
pub(crate) fn is_smaller_than_raw(payload_len: u64, image: &ImageMetadata, bits: u32) -> bool {
    let plane_count = image.plane_count().max(1) as u64;
    let raw_plane = (image.size_x() as u64 * image.size_y() as u64 * bits as u64) / 8;
    payload_len / plane_count < raw_plane
}

/// Decompresses a gzip payload when it is smaller than its raw size
///
/// Some files are tagged gzip but hold raw pixels; those are read directly.
fn load_compressed_payload(
    meta: &mut IcsMetadata,
    pixels: &mut dyn SeekableReader,
    fields: &HeaderFields,
) -> FormatResult<()> {
    let tag = match fields.compression.as_deref().map(str::trim) {
        Some(tag) => tag,
        None => return Ok(()),
    };
    let handler: Box<dyn CompressionHandler> = match CompressionFactory::get_handler_by_name(tag) {
        Ok(handler) if handler.name() == "gzip" => handler,
        Ok(handler) if handler.is_identity() => return Ok(()),
        _ => {
            warn!("Ignoring unsupported ICS compression '{}'", tag);
            return Ok(());
        }
    };

    let remaining = pixels.length()?.saturating_sub(meta.pixel_offset);
    if !is_smaller_than_raw(remaining, &meta.core.images[0], meta.bits_per_pixel) {
        info!("Payload tagged gzip already has raw size, reading it uncompressed");
        return Ok(());
    }

    debug!("Decompressing {} bytes of gzip pixel data", remaining);
    pixels.seek(SeekFrom::Start(meta.pixel_offset))?;
    let mut packed = Vec::with_capacity(remaining as usize);
    pixels.read_to_end(&mut packed)?;
    let payload = handler.decompress(&packed)?;
    meta.payload = Some(Arc::new(payload));
    Ok(())
}
