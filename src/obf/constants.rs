//! OBF format constants
//!
//! Magic strings, record sizes and the numeric codes used in stack headers.

use crate::metadata::PixelKind;

/// File and stack header constants
pub mod header {
    /// Magic string opening every file
    pub const FILE_MAGIC: &[u8; 8] = b"OMAS_BF\n";

    /// Magic string opening every stack record
    pub const STACK_MAGIC: &[u8; 14] = b"OMAS_BF_STACK\n";

    /// 0xFFFF as stored in the i16 following each magic string
    pub const MAGIC_NUMBER: i16 = -1;

    /// Newest file version understood
    pub const FILE_VERSION: i32 = 1;

    /// Newest stack version understood
    pub const STACK_VERSION: i32 = 3;

    /// Size slots every stack header carries
    pub const MAX_DIMENSIONS: usize = 15;

    /// Dimensions mapped onto X, Y, Z, Channel, Time
    pub const SUPPORTED_DIMENSIONS: usize = 5;

    /// Bytes before the file description: magic, magic number, version,
    /// first stack position, description length
    pub const FILE_HEADER_SIZE: u64 = 8 + 2 + 4 + 8 + 4;

    /// Bytes of a stack header before its name and description
    pub const STACK_HEADER_SIZE: u64 = 14 + 2 + 4 + 4 + 15 * 4 + 15 * 8 + 15 * 8 + 4 + 4 + 4 + 4 + 4 + 8 + 8 + 8;

    /// Footer bytes before the label area: size field plus two presence tables
    pub const FOOTER_FIXED_SIZE: u64 = 4 + 15 * 4 + 15 * 4;

    /// Upper bound on stacks followed in one file
    pub const MAX_STACKS: usize = 65536;
}

/// Stack compression codes
pub mod compression {
    pub const NONE: i32 = 0;
    pub const ZLIB: i32 = 1;
}

/// Stack pixel type codes
pub mod pixel_types {
    pub const UINT8: i32 = 0x01;
    pub const INT8: i32 = 0x02;
    pub const UINT16: i32 = 0x04;
    pub const INT16: i32 = 0x08;
    pub const UINT32: i32 = 0x10;
    pub const INT32: i32 = 0x20;
    pub const FLOAT32: i32 = 0x40;
    pub const FLOAT64: i32 = 0x80;
}

/// Maps a stack pixel type code to a pixel kind
pub fn pixel_kind_from_code(code: i32) -> Option<PixelKind> {
    match code {
        pixel_types::UINT8 => Some(PixelKind::Uint8),
        pixel_types::INT8 => Some(PixelKind::Int8),
        pixel_types::UINT16 => Some(PixelKind::Uint16),
        pixel_types::INT16 => Some(PixelKind::Int16),
        pixel_types::UINT32 => Some(PixelKind::Uint32),
        pixel_types::INT32 => Some(PixelKind::Int32),
        pixel_types::FLOAT32 => Some(PixelKind::Float32),
        pixel_types::FLOAT64 => Some(PixelKind::Float64),
        _ => None,
    }
}

/// Stack pixel type code of a pixel kind
pub fn pixel_code(kind: PixelKind) -> i32 {
    match kind {
        PixelKind::Uint8 => pixel_types::UINT8,
        PixelKind::Int8 => pixel_types::INT8,
        PixelKind::Uint16 => pixel_types::UINT16,
        PixelKind::Int16 => pixel_types::INT16,
        PixelKind::Uint32 => pixel_types::UINT32,
        PixelKind::Int32 => pixel_types::INT32,
        PixelKind::Float32 => pixel_types::FLOAT32,
        PixelKind::Float64 => pixel_types::FLOAT64,
    }
}
