//! Plane-ordered stream compression for writers
//!
//! Stream-compressed payloads can only be produced front to back. The
//! [`PlaneStreamEncoder`] buffers the plane currently being assembled from
//! regions, pushes it through the encoder once a later plane arrives, and
//! pads skipped planes with zeros.

use std::io::Write;

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use log::debug;

use crate::format::errors::{FormatError, FormatResult};

/// Framing of the compressed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Gzip,
    Zlib,
}

enum Sink {
    Gzip(GzEncoder<Vec<u8>>),
    Zlib(ZlibEncoder<Vec<u8>>),
}

impl Sink {
    fn write_all(&mut self, data: &[u8]) -> FormatResult<()> {
        match self {
            Sink::Gzip(encoder) => encoder.write_all(data)?,
            Sink::Zlib(encoder) => encoder.write_all(data)?,
        }
        Ok(())
    }

    fn finish(self) -> FormatResult<Vec<u8>> {
        let bytes = match self {
            Sink::Gzip(encoder) => encoder.finish()?,
            Sink::Zlib(encoder) => encoder.finish()?,
        };
        Ok(bytes)
    }
}

/// Sequential encoder for the planes of one image
pub struct PlaneStreamEncoder {
    sink: Sink,
    plane_bytes: usize,
    plane_count: usize,
    /// Planes already pushed through the encoder
    flushed: usize,
    /// Plane currently being assembled
    pending: Option<(usize, Vec<u8>)>,
}

impl PlaneStreamEncoder {
    /// Creates an encoder for `plane_count` planes of `plane_bytes` each
    pub fn new(kind: StreamKind, plane_bytes: usize, plane_count: usize) -> Self {
        let sink = match kind {
            StreamKind::Gzip => Sink::Gzip(GzEncoder::new(Vec::new(), Compression::default())),
            StreamKind::Zlib => Sink::Zlib(ZlibEncoder::new(Vec::new(), Compression::default())),
        };
        PlaneStreamEncoder {
            sink,
            plane_bytes,
            plane_count,
            flushed: 0,
            pending: None,
        }
    }

    fn flush_pending(&mut self) -> FormatResult<()> {
        if let Some((plane, bytes)) = self.pending.take() {
            self.pad_until(plane)?;
            self.sink.write_all(&bytes)?;
            self.flushed = plane + 1;
        }
        Ok(())
    }

    fn pad_until(&mut self, plane: usize) -> FormatResult<()> {
        if self.flushed < plane {
            let zeros = vec![0u8; self.plane_bytes];
            while self.flushed < plane {
                debug!("Padding unwritten plane {} with zeros", self.flushed);
                self.sink.write_all(&zeros)?;
                self.flushed += 1;
            }
        }
        Ok(())
    }

    /// Buffer of the plane being assembled
    ///
    /// Moving to a later plane encodes the pending one first.
    ///
    /// # Errors
    /// `IndexOutOfRange` when `plane` precedes the pending or an encoded plane
    pub fn plane_buffer(&mut self, plane: usize) -> FormatResult<&mut [u8]> {
        if plane >= self.plane_count {
            return Err(FormatError::IndexOutOfRange(format!(
                "plane index {} must be < {}",
                plane, self.plane_count
            )));
        }
        let current = self.pending.as_ref().map(|(index, _)| *index);
        match current {
            Some(index) if index == plane => {}
            Some(index) if plane < index => {
                return Err(FormatError::IndexOutOfRange(format!(
                    "plane {} arrived after plane {} in a sequential stream",
                    plane, index
                )));
            }
            _ => {
                if plane < self.flushed {
                    return Err(FormatError::IndexOutOfRange(format!(
                        "plane {} was already encoded",
                        plane
                    )));
                }
                self.flush_pending()?;
                self.pending = Some((plane, vec![0u8; self.plane_bytes]));
            }
        }
        match self.pending.as_mut() {
            Some((_, bytes)) => Ok(bytes.as_mut_slice()),
            None => Err(FormatError::GenericError("no pending plane".to_string())),
        }
    }

    /// Encodes the remaining planes and returns the finished stream
    pub fn finish(mut self) -> FormatResult<Vec<u8>> {
        self.flush_pending()?;
        let plane_count = self.plane_count;
        self.pad_until(plane_count)?;
        self.sink.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::{CompressionHandler, GzipHandler, ZlibHandler};

    #[test]
    fn test_planes_in_order_with_gap() {
        let mut encoder = PlaneStreamEncoder::new(StreamKind::Zlib, 4, 3);
        encoder.plane_buffer(0).unwrap().copy_from_slice(&[1, 2, 3, 4]);
        encoder.plane_buffer(2).unwrap()[..2].copy_from_slice(&[9, 9]);

        let packed = encoder.finish().unwrap();
        let plain = ZlibHandler.decompress(&packed).unwrap();
        assert_eq!(plain, vec![1, 2, 3, 4, 0, 0, 0, 0, 9, 9, 0, 0]);
    }

    #[test]
    fn test_regions_accumulate_in_pending_plane() {
        let mut encoder = PlaneStreamEncoder::new(StreamKind::Gzip, 2, 1);
        encoder.plane_buffer(0).unwrap()[0] = 5;
        encoder.plane_buffer(0).unwrap()[1] = 6;

        let plain = GzipHandler.decompress(&encoder.finish().unwrap()).unwrap();
        assert_eq!(plain, vec![5, 6]);
    }

    #[test]
    fn test_earlier_plane_rejected() {
        let mut encoder = PlaneStreamEncoder::new(StreamKind::Zlib, 2, 3);
        encoder.plane_buffer(1).unwrap();
        assert!(matches!(encoder.plane_buffer(0), Err(FormatError::IndexOutOfRange(_))));
        encoder.plane_buffer(2).unwrap();
        assert!(matches!(encoder.plane_buffer(1), Err(FormatError::IndexOutOfRange(_))));
    }
}
