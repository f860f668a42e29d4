//! ICS plane reading

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::format::errors::{FormatError, FormatResult};
use crate::format::parser::{FormatMetadata, Parser};
use crate::format::reader::{self, PlaneReader};
use crate::format::region::Region;
use crate::format::validation;
use crate::ics::metadata::IcsMetadata;
use crate::ics::parser::IcsParser;
use crate::ics::FORMAT_NAME;
use crate::io::seekable::SeekableReader;
use crate::metadata::{ImageMetadata, Metadata};

/// Channels beyond which interleaved channels are split into planes
const MAX_COMPOSITE_CHANNELS: usize = 4;

struct BoundDataset {
    meta: IcsMetadata,
    stream: Box<dyn SeekableReader>,
    /// Whole raw payload, read on first use when channels must be split
    buffered: Option<Arc<Vec<u8>>>,
}

/// Reader for ICS datasets
#[derive(Default)]
pub struct IcsReader {
    bound: Option<BoundDataset>,
}

impl IcsReader {
    pub fn new() -> Self {
        IcsReader { bound: None }
    }

    /// Parses a file and its companion and binds to the pixel data
    pub fn open(path: &Path) -> FormatResult<Self> {
        let (meta, stream) = IcsParser::new().parse_path(path)?;
        let mut reader = IcsReader::new();
        reader.bind(meta, stream);
        Ok(reader)
    }

    /// Binds parsed metadata and the stream holding its pixels
    pub fn bind(&mut self, meta: IcsMetadata, stream: Box<dyn SeekableReader>) {
        self.bound = Some(BoundDataset {
            meta,
            stream,
            buffered: None,
        });
    }

    /// The full ICS description of the bound dataset
    pub fn ics_metadata(&self) -> FormatResult<&IcsMetadata> {
        self.bound
            .as_ref()
            .map(|bound| &bound.meta)
            .ok_or_else(|| reader::not_bound(FORMAT_NAME))
    }
}

/// Reads the raw payload of every plane in one pass
fn read_payload(
    stream: &mut dyn SeekableReader,
    offset: u64,
    image: &ImageMetadata,
) -> FormatResult<Arc<Vec<u8>>> {
    let size = image.plane_byte_count()? * image.plane_count();
    debug!("Buffering {} bytes of channel-interleaved pixel data", size);
    stream.seek(SeekFrom::Start(offset))?;
    let mut payload = vec![0u8; size];
    stream.read_exact(&mut payload)?;
    Ok(Arc::new(payload))
}

/// Extracts one channel of a channel-interleaved payload
///
/// Plane `p` is channel `p % C` of frame `p / C`.
fn copy_channel(
    payload: &[u8],
    image: &ImageMetadata,
    plane_index: usize,
    region: &Region,
    buf: &mut [u8],
) -> FormatResult<()> {
    let bpp = image.bytes_per_pixel()?;
    let channels = image.size_c();
    let size_x = image.size_x();
    let channel = plane_index % channels;
    let frame = plane_index / channels;
    let frame_start = frame * size_x * image.size_y() * channels * bpp;

    for row in 0..region.height {
        for col in 0..region.width {
            let pixel = (region.y + row) * size_x + region.x + col;
            let source = frame_start + (pixel * channels + channel) * bpp;
            let sample = payload.get(source..source + bpp).ok_or_else(|| {
                FormatError::CorruptData(format!("pixel data ends before byte {}", source + bpp))
            })?;
            let dest = (row * region.width + col) * bpp;
            buf[dest..dest + bpp].copy_from_slice(sample);
        }
    }
    Ok(())
}

impl PlaneReader for IcsReader {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn metadata(&self) -> FormatResult<&Metadata> {
        Ok(self.ics_metadata()?.metadata())
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
            ref mut buffered,
        } = *self.bound.as_mut().ok_or_else(|| reader::not_bound(FORMAT_NAME))?;

        let image = validation::check_region_request(&meta.core, image_index, plane_index, &region, buf.len())?;
        let pixel = image.pixel_stride()?;
        let plane_bytes = image.plane_byte_count()?;
        let row_bytes = region.width * pixel;

        if !image.is_rgb() && image.size_c() > MAX_COMPOSITE_CHANNELS && meta.channels_interleaved {
            let payload = match (&meta.payload, buffered.as_ref()) {
                (Some(payload), _) => Arc::clone(payload),
                (None, Some(payload)) => Arc::clone(payload),
                (None, None) => {
                    let payload = read_payload(stream.as_mut(), meta.pixel_offset, image)?;
                    *buffered = Some(Arc::clone(&payload));
                    payload
                }
            };
            copy_channel(&payload, image, plane_index, &region, buf)?;
        } else if let Some(payload) = &meta.payload {
            let start = plane_index * plane_bytes;
            let plane = payload.get(start..start + plane_bytes).ok_or_else(|| {
                FormatError::CorruptData(format!(
                    "decompressed pixel data holds {} bytes, plane {} needs {}",
                    payload.len(),
                    plane_index,
                    start + plane_bytes
                ))
            })?;
            reader::copy_region(plane, image.size_x(), pixel, &region, buf)?;
        } else {
            let plane_offset = meta.pixel_offset + (plane_index * plane_bytes) as u64;
            reader::read_positional(stream.as_mut(), plane_offset, image.size_x(), pixel, &region, buf)?;
        }

        if meta.invert_y {
            reader::flip_rows(&mut buf[..row_bytes * region.height], row_bytes, region.height);
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.bound.take().is_some() {
            debug!("Closed ICS reader");
        }
    }
}
