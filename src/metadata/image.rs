//! Per-image structural metadata

use std::fmt;

use crate::format::errors::{FormatError, FormatResult};
use crate::io::byte_order::ByteOrder;
use crate::metadata::axis::Axis;
use crate::metadata::pixel::PixelKind;
use crate::metadata::table::MetaTable;

/// Largest channel count that can be composited as RGB samples
pub const MAX_RGB_CHANNELS: usize = 4;

/// Structural description of one logical image
///
/// This is plain data: parsers fill it in, readers and writers only consult
/// it. Decoder state never lives here.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata {
    /// Extent of each axis, indexed by [`Axis::index`]; X and Y are 0 until resolved
    axis_lengths: [usize; 5],
    /// Axis order of the stored planes, starting with X and Y
    pub dimension_order: Vec<Axis>,
    /// Numeric kind of each sample, resolved by the parser
    pub pixel_kind: Option<PixelKind>,
    /// Byte order of multi-byte samples
    pub little_endian: bool,
    /// Channels are composited per pixel rather than stored as separate planes
    pub rgb: bool,
    /// RGB samples are interleaved within each pixel
    pub interleaved: bool,
    pub indexed: bool,
    pub false_color: bool,
    pub thumbnail: bool,
    pub order_certain: bool,
    pub metadata_complete: bool,
    /// Image name, when the format records one
    pub name: Option<String>,
    /// Format-specific annotations
    pub table: MetaTable,
}

impl Default for ImageMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageMetadata {
    /// Creates metadata with unresolved X/Y, unit Z/C/T and no pixel kind
    pub fn new() -> Self {
        ImageMetadata {
            axis_lengths: [0, 0, 1, 1, 1],
            dimension_order: Axis::ALL.to_vec(),
            pixel_kind: None,
            little_endian: false,
            rgb: false,
            interleaved: false,
            indexed: false,
            false_color: false,
            thumbnail: false,
            order_certain: true,
            metadata_complete: false,
            name: None,
            table: MetaTable::new(),
        }
    }

    /// Convenience constructor for fully resolved metadata
    ///
    /// # Arguments
    /// * `sizes` - Extents in X, Y, Z, Channel, Time order
    /// * `pixel_kind` - Sample representation
    pub fn with_geometry(sizes: [usize; 5], pixel_kind: PixelKind) -> Self {
        let mut meta = Self::new();
        meta.axis_lengths = sizes;
        meta.pixel_kind = Some(pixel_kind);
        meta.metadata_complete = true;
        meta
    }

    /// Extent of one axis
    pub fn axis_length(&self, axis: Axis) -> usize {
        self.axis_lengths[axis.index()]
    }

    /// Sets the extent of one axis
    pub fn set_axis_length(&mut self, axis: Axis, length: usize) {
        self.axis_lengths[axis.index()] = length;
    }

    pub fn size_x(&self) -> usize {
        self.axis_length(Axis::X)
    }

    pub fn size_y(&self) -> usize {
        self.axis_length(Axis::Y)
    }

    pub fn size_z(&self) -> usize {
        self.axis_length(Axis::Z)
    }

    pub fn size_c(&self) -> usize {
        self.axis_length(Axis::Channel)
    }

    pub fn size_t(&self) -> usize {
        self.axis_length(Axis::Time)
    }

    /// Whether channels are effectively composited as RGB
    ///
    /// The flag only takes effect for at most four channels.
    pub fn is_rgb(&self) -> bool {
        self.rgb && self.size_c() <= MAX_RGB_CHANNELS
    }

    /// Samples stored per pixel of one plane
    pub fn rgb_channel_count(&self) -> usize {
        if self.is_rgb() {
            self.size_c()
        } else {
            1
        }
    }

    /// Channels that map to separate planes
    pub fn effective_size_c(&self) -> usize {
        if self.is_rgb() {
            1
        } else {
            self.size_c()
        }
    }

    /// Number of planes, Z x T x effective channels
    pub fn plane_count(&self) -> usize {
        self.size_z() * self.size_t() * self.effective_size_c()
    }

    /// Byte order of the samples
    pub fn byte_order(&self) -> ByteOrder {
        ByteOrder::from_little_endian(self.little_endian)
    }

    /// The resolved pixel kind
    pub fn resolved_pixel_kind(&self) -> FormatResult<PixelKind> {
        self.pixel_kind
            .ok_or_else(|| FormatError::NotConfigured("pixel kind is not resolved".to_string()))
    }

    /// Bytes per sample of the resolved pixel kind
    pub fn bytes_per_pixel(&self) -> FormatResult<usize> {
        Ok(self.resolved_pixel_kind()?.bytes_per_pixel())
    }

    /// Bytes of one stored pixel, all RGB samples included
    pub fn pixel_stride(&self) -> FormatResult<usize> {
        Ok(self.bytes_per_pixel()? * self.rgb_channel_count())
    }

    /// Bytes of one full plane
    pub fn plane_byte_count(&self) -> FormatResult<usize> {
        Ok(self.size_x() * self.size_y() * self.pixel_stride()?)
    }

    /// Dimension order as letters, for example `XYCZT`
    pub fn dimension_order_string(&self) -> String {
        self.dimension_order.iter().map(Axis::letter).collect()
    }

    /// Checks the invariants required before plane I/O
    ///
    /// X and Y must be positive, every other axis at least 1, and the pixel kind
    /// resolved. The byte size of the whole image must fit in a `usize`, so
    /// plane and offset arithmetic after validation cannot overflow.
    pub fn validate(&self) -> FormatResult<()> {
        if self.size_x() == 0 || self.size_y() == 0 {
            return Err(FormatError::CorruptHeader(format!(
                "plane size {}x{} is not positive",
                self.size_x(),
                self.size_y()
            )));
        }
        for axis in [Axis::Z, Axis::Channel, Axis::Time] {
            if self.axis_length(axis) == 0 {
                return Err(FormatError::CorruptHeader(format!("{} length is zero", axis)));
            }
        }
        let kind = self
            .pixel_kind
            .ok_or_else(|| FormatError::CorruptHeader("pixel kind is not resolved".to_string()))?;

        let plane_bytes = self
            .size_x()
            .checked_mul(self.size_y())
            .and_then(|n| n.checked_mul(kind.bytes_per_pixel()))
            .and_then(|n| n.checked_mul(self.rgb_channel_count()));
        let planes = self
            .size_z()
            .checked_mul(self.size_t())
            .and_then(|n| n.checked_mul(self.effective_size_c()));
        match (plane_bytes, planes) {
            (Some(plane_bytes), Some(planes)) if plane_bytes.checked_mul(planes).is_some() => Ok(()),
            _ => Err(FormatError::UnsupportedDimensionality(format!(
                "{}x{}x{}x{}x{} {} pixels do not fit in addressable memory",
                self.size_x(),
                self.size_y(),
                self.size_z(),
                self.size_c(),
                self.size_t(),
                kind
            ))),
        }
    }
}

impl fmt::Display for ImageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            writeln!(f, "  Name: {}", name)?;
        }
        writeln!(
            f,
            "  Dimensions: X={} Y={} Z={} C={} T={} ({})",
            self.size_x(),
            self.size_y(),
            self.size_z(),
            self.size_c(),
            self.size_t(),
            self.dimension_order_string()
        )?;
        match self.pixel_kind {
            Some(kind) => writeln!(f, "  Pixel kind: {}", kind)?,
            None => writeln!(f, "  Pixel kind: unresolved")?,
        }
        writeln!(f, "  Byte order: {}", self.byte_order().name())?;
        writeln!(f, "  Planes: {}", self.plane_count())?;
        writeln!(f, "  RGB: {} (interleaved: {})", self.is_rgb(), self.interleaved)?;
        Ok(())
    }
}
