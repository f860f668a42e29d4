//! Incremental zlib decoding over a bounded byte range
//!
//! A [`StreamInflater`] decodes a zlib stream stored at a known position and
//! length inside a larger file, producing output in caller-sized pieces. It
//! tracks its own input offset and seeks before every refill, so the shared
//! stream may be used for other reads in between.

use std::io::{Read, Seek, SeekFrom};

use flate2::{Decompress, FlushDecompress, Status};
use log::debug;

use crate::format::errors::{FormatError, FormatResult};
use crate::io::seekable::SeekableReader;

/// Maximum number of compressed bytes fed per refill
pub const INPUT_CHUNK: usize = 8192;

/// Resumable zlib decoder for one compressed region
pub struct StreamInflater {
    decompress: Decompress,
    /// Absolute position of the first compressed byte
    start: u64,
    /// Declared compressed length
    length: u64,
    /// Compressed bytes already read from the region
    consumed: u64,
    input: Vec<u8>,
    input_pos: usize,
    input_len: usize,
    finished: bool,
}

impl StreamInflater {
    /// Creates a decoder for the region `[start, start + length)`
    pub fn new(start: u64, length: u64) -> Self {
        StreamInflater {
            decompress: Decompress::new(true),
            start,
            length,
            consumed: 0,
            input: vec![0u8; INPUT_CHUNK],
            input_pos: 0,
            input_len: 0,
            finished: false,
        }
    }

    /// Total bytes produced since the last reset
    pub fn total_out(&self) -> u64 {
        self.decompress.total_out()
    }

    /// Rewinds to the start of the region with a fresh decoder
    pub fn reset(&mut self) {
        debug!("Resetting inflater at stack position {}", self.start);
        self.decompress.reset(true);
        self.consumed = 0;
        self.input_pos = 0;
        self.input_len = 0;
        self.finished = false;
    }

    fn refill(&mut self, reader: &mut dyn SeekableReader) -> FormatResult<()> {
        let remaining = self.length - self.consumed;
        if remaining == 0 {
            return Err(FormatError::CorruptData(format!(
                "compressed data at {} exhausted after {} bytes",
                self.start, self.length
            )));
        }
        let wanted = remaining.min(INPUT_CHUNK as u64) as usize;
        reader.seek(SeekFrom::Start(self.start + self.consumed))?;
        let read = reader.read(&mut self.input[..wanted])?;
        if read == 0 {
            return Err(FormatError::CorruptData(format!(
                "compressed data at {} truncated after {} of {} bytes",
                self.start, self.consumed, self.length
            )));
        }
        self.consumed += read as u64;
        self.input_pos = 0;
        self.input_len = read;
        Ok(())
    }

    /// Fills `out` completely with decoded bytes
    ///
    /// # Arguments
    /// * `reader` - Stream holding the compressed region
    /// * `out` - Destination, filled from the first byte
    ///
    /// # Errors
    /// `CorruptData` when the region runs out or the stream ends early,
    /// `UnsupportedCompression` when the stream asks for a preset dictionary.
    pub fn fill_exact(&mut self, reader: &mut dyn SeekableReader, out: &mut [u8]) -> FormatResult<()> {
        let mut filled = 0;

        while filled < out.len() {
            if self.finished {
                return Err(FormatError::CorruptData(format!(
                    "compressed stream ended {} bytes short of a full frame",
                    out.len() - filled
                )));
            }
            if self.input_pos == self.input_len {
                self.refill(reader)?;
            }

            let before_in = self.decompress.total_in();
            let before_out = self.decompress.total_out();
            let status = self
                .decompress
                .decompress(
                    &self.input[self.input_pos..self.input_len],
                    &mut out[filled..],
                    FlushDecompress::None,
                )
                .map_err(|e| {
                    if e.needs_dictionary().is_some() {
                        FormatError::UnsupportedCompression("zlib stream requires a preset dictionary".to_string())
                    } else {
                        FormatError::CorruptData(format!("zlib stream: {}", e))
                    }
                })?;
            let used = (self.decompress.total_in() - before_in) as usize;
            let produced = (self.decompress.total_out() - before_out) as usize;
            self.input_pos += used;
            filled += produced;

            match status {
                Status::StreamEnd => self.finished = true,
                Status::Ok | Status::BufError => {
                    if used == 0 && produced == 0 && self.input_pos < self.input_len {
                        return Err(FormatError::CorruptData("zlib stream made no progress".to_string()));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    fn compressed(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_fill_exact_in_frames() {
        let data: Vec<u8> = (0..40_000u32).map(|v| (v % 251) as u8).collect();
        let mut file = vec![0xAAu8; 7];
        let packed = compressed(&data);
        file.extend_from_slice(&packed);
        let mut cursor = Cursor::new(file);

        let mut inflater = StreamInflater::new(7, packed.len() as u64);
        let mut frame = vec![0u8; 10_000];
        for number in 0..4 {
            inflater.fill_exact(&mut cursor, &mut frame).unwrap();
            assert_eq!(&frame[..], &data[number * 10_000..(number + 1) * 10_000]);
        }
        assert!(matches!(
            inflater.fill_exact(&mut cursor, &mut frame),
            Err(FormatError::CorruptData(_))
        ));
    }

    #[test]
    fn test_reset_replays_from_start() {
        let data: Vec<u8> = (0..4096u32).map(|v| (v * 7) as u8).collect();
        let packed = compressed(&data);
        let mut cursor = Cursor::new(packed.clone());

        let mut inflater = StreamInflater::new(0, packed.len() as u64);
        let mut first = vec![0u8; 1024];
        inflater.fill_exact(&mut cursor, &mut first).unwrap();
        let mut second = vec![0u8; 1024];
        inflater.fill_exact(&mut cursor, &mut second).unwrap();
        assert_eq!(inflater.total_out(), 2048);

        inflater.reset();
        assert_eq!(inflater.total_out(), 0);
        let mut again = vec![0u8; 1024];
        inflater.fill_exact(&mut cursor, &mut again).unwrap();
        assert_eq!(inflater.total_out(), 1024);
        assert_eq!(first, again);
        assert_eq!(&again[..], &data[..1024]);
    }

    #[test]
    fn test_truncated_region() {
        let mut seed = 12345u32;
        let data: Vec<u8> = (0..5000)
            .map(|_| {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                (seed >> 16) as u8
            })
            .collect();
        let packed = compressed(&data);
        let mut cursor = Cursor::new(packed.clone());

        let mut inflater = StreamInflater::new(0, (packed.len() / 2) as u64);
        let mut frame = vec![0u8; 5000];
        assert!(matches!(
            inflater.fill_exact(&mut cursor, &mut frame),
            Err(FormatError::CorruptData(_))
        ));
    }
}
