//! Parsed ICS dataset description

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::format::parser::FormatMetadata;
use crate::metadata::Metadata;

/// Acquisition annotations recognized in the header
///
/// Every field is optional; malformed values are skipped while parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IcsAnnotations {
    pub physical_size_x: Option<f64>,
    pub physical_size_y: Option<f64>,
    pub physical_size_z: Option<f64>,
    pub time_increment: Option<f64>,
    pub wave_increment: Option<i64>,
    /// Emission wavelength per channel, 0 where unknown
    pub emission_wavelengths: Vec<i64>,
    /// Excitation wavelength per channel, 0 where unknown
    pub excitation_wavelengths: Vec<i64>,
    /// Accumulated `history` lines, each terminated by a newline
    pub history: String,
    /// ISO-8601 creation date
    pub creation_date: Option<String>,
    pub detector_gains: BTreeMap<usize, f64>,
    pub laser_wavelengths: BTreeMap<usize, i64>,
    pub objective_model: Option<String>,
    pub objective_immersion: Option<String>,
    pub objective_na: Option<f64>,
    pub objective_working_distance: Option<f64>,
    pub objective_magnification: Option<i64>,
    /// Pinhole radius per channel
    pub pinhole_sizes: Vec<f64>,
    pub author: Option<String>,
    /// Stage position in micrometers, up to X, Y, Z
    pub stage_position: Vec<f64>,
    pub description: Option<String>,
    pub channel_names: BTreeMap<usize, String>,
    pub software: Option<String>,
}

/// Everything the ICS parser learns about a dataset
#[derive(Debug, Clone, Default)]
pub struct IcsMetadata {
    /// Generic description of the single image
    pub core: Metadata,
    /// Bit depth as declared, before rounding to whole bytes
    pub bits_per_pixel: u32,
    /// Header and pixels share one file
    pub version_two: bool,
    pub header_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
    /// Offset of the first pixel byte in the pixel stream
    pub pixel_offset: u64,
    /// Pixel data decompressed while parsing
    pub payload: Option<Arc<Vec<u8>>>,
    /// Rows are stored bottom-up
    pub invert_y: bool,
    /// Channel samples are interleaved per pixel in the file
    pub channels_interleaved: bool,
    pub annotations: IcsAnnotations,
}

impl IcsMetadata {
    /// Whether pixel data was decompressed at parse time
    pub fn is_decompressed(&self) -> bool {
        self.payload.is_some()
    }
}

impl FormatMetadata for IcsMetadata {
    fn metadata(&self) -> &Metadata {
        &self.core
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.core
    }
}
