//! Byte order handling for binary headers
//!
//! This module implements the Strategy pattern for handling different
//! byte orders (little-endian vs big-endian) when reading and writing
//! fixed-width header values.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Result;

use crate::io::seekable::{SeekableReader, SeekableWriter};

/// Represents the byte order of multi-byte values in a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Least significant byte first
    LittleEndian,
    /// Most significant byte first
    BigEndian,
}

impl ByteOrder {
    /// Maps the `little_endian` flag carried by image metadata to a byte order
    pub fn from_little_endian(little_endian: bool) -> Self {
        if little_endian {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        }
    }

    /// Whether this is little-endian
    pub fn is_little_endian(&self) -> bool {
        *self == ByteOrder::LittleEndian
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian",
            ByteOrder::BigEndian => "Big Endian",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Trait for byte order handling strategies
pub trait ByteOrderHandler: Send + Sync {
    /// Read an i16 value
    fn read_i16(&self, reader: &mut dyn SeekableReader) -> Result<i16>;

    /// Read an i32 value
    fn read_i32(&self, reader: &mut dyn SeekableReader) -> Result<i32>;

    /// Read an i64 value
    fn read_i64(&self, reader: &mut dyn SeekableReader) -> Result<i64>;

    /// Read an f64 value
    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64>;

    /// Write an i16 value
    fn write_i16(&self, writer: &mut dyn SeekableWriter, value: i16) -> Result<()>;

    /// Write an i32 value
    fn write_i32(&self, writer: &mut dyn SeekableWriter, value: i32) -> Result<()>;

    /// Write an i64 value
    fn write_i64(&self, writer: &mut dyn SeekableWriter, value: i64) -> Result<()>;

    /// Write an f64 value
    fn write_f64(&self, writer: &mut dyn SeekableWriter, value: f64) -> Result<()>;
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_i16(&self, reader: &mut dyn SeekableReader) -> Result<i16> {
        reader.read_i16::<LittleEndian>()
    }

    fn read_i32(&self, reader: &mut dyn SeekableReader) -> Result<i32> {
        reader.read_i32::<LittleEndian>()
    }

    fn read_i64(&self, reader: &mut dyn SeekableReader) -> Result<i64> {
        reader.read_i64::<LittleEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<LittleEndian>()
    }

    fn write_i16(&self, writer: &mut dyn SeekableWriter, value: i16) -> Result<()> {
        writer.write_i16::<LittleEndian>(value)
    }

    fn write_i32(&self, writer: &mut dyn SeekableWriter, value: i32) -> Result<()> {
        writer.write_i32::<LittleEndian>(value)
    }

    fn write_i64(&self, writer: &mut dyn SeekableWriter, value: i64) -> Result<()> {
        writer.write_i64::<LittleEndian>(value)
    }

    fn write_f64(&self, writer: &mut dyn SeekableWriter, value: f64) -> Result<()> {
        writer.write_f64::<LittleEndian>(value)
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_i16(&self, reader: &mut dyn SeekableReader) -> Result<i16> {
        reader.read_i16::<BigEndian>()
    }

    fn read_i32(&self, reader: &mut dyn SeekableReader) -> Result<i32> {
        reader.read_i32::<BigEndian>()
    }

    fn read_i64(&self, reader: &mut dyn SeekableReader) -> Result<i64> {
        reader.read_i64::<BigEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<BigEndian>()
    }

    fn write_i16(&self, writer: &mut dyn SeekableWriter, value: i16) -> Result<()> {
        writer.write_i16::<BigEndian>(value)
    }

    fn write_i32(&self, writer: &mut dyn SeekableWriter, value: i32) -> Result<()> {
        writer.write_i32::<BigEndian>(value)
    }

    fn write_i64(&self, writer: &mut dyn SeekableWriter, value: i64) -> Result<()> {
        writer.write_i64::<BigEndian>(value)
    }

    fn write_f64(&self, writer: &mut dyn SeekableWriter, value: f64) -> Result<()> {
        writer.write_f64::<BigEndian>(value)
    }
}

/// Reverses the bytes of every sample in place
///
/// Converts packed samples between big- and little-endian storage. Single
/// byte samples and a trailing partial sample are left untouched.
pub fn swap_sample_bytes(buf: &mut [u8], sample_bytes: usize) {
    if sample_bytes < 2 {
        return;
    }
    for sample in buf.chunks_exact_mut(sample_bytes) {
        sample.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_handlers_disagree_on_layout() {
        let mut little = Cursor::new(Vec::new());
        ByteOrder::LittleEndian.create_handler().write_i32(&mut little, 0x0102_0304).unwrap();
        let mut big = Cursor::new(Vec::new());
        ByteOrder::BigEndian.create_handler().write_i32(&mut big, 0x0102_0304).unwrap();

        assert_eq!(little.get_ref(), &vec![4, 3, 2, 1]);
        assert_eq!(big.get_ref(), &vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_read_back_values() {
        let handler = ByteOrder::LittleEndian.create_handler();
        let mut stream = Cursor::new(Vec::new());
        handler.write_i16(&mut stream, -1).unwrap();
        handler.write_i64(&mut stream, 1 << 40).unwrap();
        handler.write_f64(&mut stream, 0.25).unwrap();

        stream.set_position(0);
        assert_eq!(handler.read_i16(&mut stream).unwrap(), -1);
        assert_eq!(handler.read_i64(&mut stream).unwrap(), 1 << 40);
        assert_eq!(handler.read_f64(&mut stream).unwrap(), 0.25);
    }

    #[test]
    fn test_swap_sample_bytes() {
        let mut samples = vec![1, 2, 3, 4, 5, 6, 7];
        swap_sample_bytes(&mut samples, 2);
        assert_eq!(samples, vec![2, 1, 4, 3, 6, 5, 7]);

        let mut bytes = vec![1, 2, 3];
        swap_sample_bytes(&mut bytes, 1);
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_from_little_endian() {
        assert!(ByteOrder::from_little_endian(true).is_little_endian());
        assert_eq!(ByteOrder::from_little_endian(false), ByteOrder::BigEndian);
    }
}
