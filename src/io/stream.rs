//! Stream convenience operations
//!
//! Extends every [`SeekableReader`] with the cursor queries and text reads the
//! format parsers need: position, total length, relative skips, fixed-length
//! strings and newline-terminated text lines.

use std::io::{self, Read, Seek, SeekFrom};

use crate::io::seekable::SeekableReader;
use crate::utils::string_utils;

/// Chunk size used when scanning for a line terminator
const LINE_SCAN_CHUNK: usize = 512;

/// Extension trait adding stream queries on top of `Read + Seek`
pub trait StreamExt: SeekableReader {
    /// Current absolute position
    fn current_position(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    /// Total length of the stream; the position is left unchanged
    fn length(&mut self) -> io::Result<u64> {
        let current = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(current))?;
        Ok(end)
    }

    /// Moves the cursor by `count` bytes relative to the current position
    fn skip_bytes(&mut self, count: i64) -> io::Result<u64> {
        self.seek(SeekFrom::Current(count))
    }

    /// Reads exactly `length` bytes and decodes them as text
    ///
    /// Trailing NUL padding is dropped and invalid UTF-8 is replaced rather
    /// than rejected, since header strings are frequently Latin-1.
    fn read_string(&mut self, length: usize) -> io::Result<String> {
        let mut buffer = vec![0u8; length];
        self.read_exact(&mut buffer)?;
        string_utils::trim_trailing_nulls(&mut buffer);
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Reads one line terminated by `\n`, without the terminator
    ///
    /// A trailing `\r` is removed as well. The cursor is left right after the
    /// terminator, so the caller can continue with binary reads. Returns `None`
    /// at end of stream.
    fn read_text_line(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();
        let mut chunk = [0u8; LINE_SCAN_CHUNK];

        loop {
            let read = self.read(&mut chunk)?;
            if read == 0 {
                if line.is_empty() {
                    return Ok(None);
                }
                break;
            }

            if let Some(newline) = chunk[..read].iter().position(|&b| b == b'\n') {
                line.extend_from_slice(&chunk[..newline]);
                let unread = (read - newline - 1) as i64;
                if unread > 0 {
                    self.seek(SeekFrom::Current(-unread))?;
                }
                break;
            }

            line.extend_from_slice(&chunk[..read]);
        }

        if line.last() == Some(&b'\r') {
            line.pop();
        }

        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}

impl<T: SeekableReader + ?Sized> StreamExt for T {}
