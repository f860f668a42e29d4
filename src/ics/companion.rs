//! Header/data companion file pairing
//!
//! A version 1 dataset is a `.ics` header next to a `.ids` data file whose
//! names differ only in the second to last character. Version 2.0 files
//! carry the pixel data after the header in the same file.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::debug;

use crate::format::errors::{FormatError, FormatResult};

/// Header prefix of a self-contained file, compared after trimming
pub const VERSION_TWO_MARKER: &str = "ics_version\t2.0";

/// Bytes examined when looking for the version marker
pub const VERSION_PREFIX_LENGTH: usize = 17;

/// Resolved file pair of one dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionFiles {
    pub header: PathBuf,
    /// Pixel data file; `None` for self-contained version 2.0 files
    pub data: Option<PathBuf>,
}

impl CompanionFiles {
    pub fn is_version_two(&self) -> bool {
        self.data.is_none()
    }
}

/// Shifts the second to last character of the file name by `delta`
fn shift_name(path: &Path, delta: i8) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let mut chars: Vec<char> = name.chars().collect();
    if chars.len() < 2 {
        return None;
    }
    let index = chars.len() - 2;
    let shifted = (chars[index] as u32).checked_add_signed(delta as i32)?;
    chars[index] = char::from_u32(shifted)?;
    Some(path.with_file_name(chars.into_iter().collect::<String>()))
}

/// Header and data paths implied by a file name, before existence checks
///
/// `x.ics` pairs with `x.ids` and vice versa, regardless of case. Other
/// extensions pair with themselves.
pub fn companion_names(path: &Path) -> (PathBuf, PathBuf) {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("ics") => {
            let data = shift_name(path, 1).unwrap_or_else(|| path.to_path_buf());
            (path.to_path_buf(), data)
        }
        Some("ids") => {
            let header = shift_name(path, -1).unwrap_or_else(|| path.to_path_buf());
            (header, path.to_path_buf())
        }
        _ => (path.to_path_buf(), path.to_path_buf()),
    }
}

/// Whether the leading bytes mark a self-contained version 2.0 file
pub fn is_version_two_prefix(prefix: &[u8]) -> bool {
    String::from_utf8_lossy(prefix).trim() == VERSION_TWO_MARKER
}

fn read_prefix(path: &Path) -> FormatResult<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut prefix = Vec::with_capacity(VERSION_PREFIX_LENGTH);
    file.by_ref()
        .take(VERSION_PREFIX_LENGTH as u64)
        .read_to_end(&mut prefix)?;
    Ok(prefix)
}

/// Resolves the files of the dataset that `path` belongs to
///
/// # Errors
/// `MissingCompanionFile` when the header, or the data file of a version 1
/// dataset, does not exist
pub fn resolve(path: &Path) -> FormatResult<CompanionFiles> {
    let (header, data) = companion_names(path);
    if !header.is_file() {
        return Err(FormatError::MissingCompanionFile(header));
    }

    if is_version_two_prefix(&read_prefix(&header)?) {
        debug!("{} is a self-contained version 2.0 file", header.display());
        return Ok(CompanionFiles { header, data: None });
    }

    if !data.is_file() {
        return Err(FormatError::MissingCompanionFile(data));
    }
    debug!("Pairing header {} with data {}", header.display(), data.display());
    Ok(CompanionFiles {
        header,
        data: Some(data),
    })
}
