//! Pixel numeric kinds

use std::fmt;

/// Numeric representation of one pixel sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelKind {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl PixelKind {
    /// Every pixel kind, integers first
    pub const ALL: [PixelKind; 8] = [
        PixelKind::Int8,
        PixelKind::Uint8,
        PixelKind::Int16,
        PixelKind::Uint16,
        PixelKind::Int32,
        PixelKind::Uint32,
        PixelKind::Float32,
        PixelKind::Float64,
    ];

    /// Number of bytes one sample occupies
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelKind::Int8 | PixelKind::Uint8 => 1,
            PixelKind::Int16 | PixelKind::Uint16 => 2,
            PixelKind::Int32 | PixelKind::Uint32 | PixelKind::Float32 => 4,
            PixelKind::Float64 => 8,
        }
    }

    /// Bit depth derived from the kind
    pub fn bits_per_pixel(&self) -> u32 {
        self.bytes_per_pixel() as u32 * 8
    }

    /// Whether samples carry a sign
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            PixelKind::Int8 | PixelKind::Int16 | PixelKind::Int32 | PixelKind::Float32 | PixelKind::Float64
        )
    }

    /// Whether samples are IEEE floating point
    pub fn is_floating_point(&self) -> bool {
        matches!(self, PixelKind::Float32 | PixelKind::Float64)
    }

    /// Maps an exact bit depth plus representation to a kind
    ///
    /// # Arguments
    /// * `bits` - Bit depth, one of 8, 16, 32 or 64
    /// * `signed` - Signedness, ignored for floating point
    /// * `floating_point` - Whether the samples are IEEE floats
    ///
    /// # Returns
    /// The matching kind, or None when the combination has no representation
    pub fn from_bits(bits: u32, signed: bool, floating_point: bool) -> Option<PixelKind> {
        match (bits, signed, floating_point) {
            (32, _, true) => Some(PixelKind::Float32),
            (64, _, true) => Some(PixelKind::Float64),
            (8, true, false) => Some(PixelKind::Int8),
            (8, false, false) => Some(PixelKind::Uint8),
            (16, true, false) => Some(PixelKind::Int16),
            (16, false, false) => Some(PixelKind::Uint16),
            (32, true, false) => Some(PixelKind::Int32),
            (32, false, false) => Some(PixelKind::Uint32),
            _ => None,
        }
    }

    /// Short lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            PixelKind::Int8 => "int8",
            PixelKind::Uint8 => "uint8",
            PixelKind::Int16 => "int16",
            PixelKind::Uint16 => "uint16",
            PixelKind::Int32 => "int32",
            PixelKind::Uint32 => "uint32",
            PixelKind::Float32 => "float",
            PixelKind::Float64 => "double",
        }
    }
}

impl fmt::Display for PixelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
