//! Format detection
//!
//! A checker decides whether a stream or a path belongs to its format. The
//! content check always restores the stream position and treats any I/O
//! failure as "not this format".

use std::fs::File;
use std::io::{self, BufReader, Seek, SeekFrom};
use std::path::Path;

use log::debug;

use crate::io::seekable::SeekableReader;

/// Strategy trait for recognizing one file family
pub trait Checker: Send + Sync {
    /// Human readable name of the format
    fn format_name(&self) -> &'static str;

    /// Lowercase file suffixes, without the dot
    fn suffixes(&self) -> &'static [&'static str];

    /// A matching suffix alone identifies the format
    fn suffix_sufficient(&self) -> bool {
        false
    }

    /// A matching suffix is required before the content is examined
    fn suffix_necessary(&self) -> bool {
        false
    }

    /// Examines the stream content; the position is restored afterwards
    fn is_format(&self, reader: &mut dyn SeekableReader) -> bool;

    /// Whether the path carries one of the format's suffixes
    fn has_suffix(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.suffixes()
                    .iter()
                    .any(|suffix| suffix.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Combines the suffix policy with the content check
    ///
    /// # Arguments
    /// * `path` - File to examine
    ///
    /// # Returns
    /// True when the file belongs to this format; open failures yield false
    fn is_format_path(&self, path: &Path) -> bool {
        let suffix_matches = self.has_suffix(path);
        if suffix_matches && self.suffix_sufficient() {
            return true;
        }
        if !suffix_matches && self.suffix_necessary() {
            return false;
        }

        match File::open(path) {
            Ok(file) => {
                let mut reader = BufReader::new(file);
                self.is_format(&mut reader)
            }
            Err(e) => {
                debug!("{} checker could not open {}: {}", self.format_name(), path.display(), e);
                false
            }
        }
    }
}

/// Runs a content check and restores the stream position
///
/// Any I/O error inside the check, or while saving and restoring the
/// position, is reported as a non-match.
pub fn inspect<F>(reader: &mut dyn SeekableReader, check: F) -> bool
where
    F: FnOnce(&mut dyn SeekableReader) -> io::Result<bool>,
{
    let start = match reader.stream_position() {
        Ok(position) => position,
        Err(_) => return false,
    };
    let result = check(reader).unwrap_or(false);
    if reader.seek(SeekFrom::Start(start)).is_err() {
        return false;
    }
    result
}
