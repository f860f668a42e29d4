use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::format::errors::{FormatError, FormatResult};
use crate::format::handle::FormatHandle;
use crate::format::reader::PlaneReader;
use crate::format::registry::FormatRegistry;
use crate::format::writer::{PlaneWriter, WriterOptions};
use crate::metadata::Metadata;

/// Main interface to the PlaneKit library
pub struct PlaneKit {
    registry: FormatRegistry,
}

impl Default for PlaneKit {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaneKit {
    /// Create a PlaneKit instance with every built-in format registered
    pub fn new() -> Self {
        PlaneKit {
            registry: FormatRegistry::default(),
        }
    }

    /// Create a PlaneKit instance over a custom registry
    pub fn with_registry(registry: FormatRegistry) -> Self {
        PlaneKit { registry }
    }

    /// The registry used for lookups
    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Name of the format a file belongs to
    ///
    /// # Arguments
    /// * `input_path` - File to examine
    ///
    /// # Returns
    /// The registered format name, or `UnsupportedFormat`
    pub fn identify(&self, input_path: &Path) -> FormatResult<&'static str> {
        let format = self.registry.lookup(input_path)?;
        debug!("{} identified as {}", input_path.display(), format.name());
        Ok(format.name())
    }

    /// Opens a file for plane reading
    ///
    /// # Arguments
    /// * `input_path` - File to open; companion files are resolved by the format
    ///
    /// # Returns
    /// A reader bound to the parsed dataset
    pub fn open(&self, input_path: &Path) -> FormatResult<Box<dyn PlaneReader>> {
        let format = self.registry.lookup(input_path)?;
        info!("Opening {} as {}", input_path.display(), format.name());
        format.open_reader(input_path)
    }

    /// Describe the structure and annotations of a file
    ///
    /// # Arguments
    /// * `input_path` - File to describe
    ///
    /// # Returns
    /// A multi-line description of every image
    pub fn describe(&self, input_path: &Path) -> FormatResult<String> {
        let mut reader = self.open(input_path)?;
        let text = describe_metadata(reader.metadata()?);
        reader.close();
        Ok(text)
    }

    /// Creates an unbound writer for a format
    ///
    /// # Arguments
    /// * `format` - Format name or file suffix, case-insensitive
    /// * `options` - Compression and ordering settings
    pub fn create_writer(&self, format: &str, options: &WriterOptions) -> FormatResult<Box<dyn PlaneWriter>> {
        let handle = self.format_by_name(format)?;
        let mut writer = handle.create_writer();
        writer.apply_options(options)?;
        Ok(writer)
    }

    /// Reads one whole plane
    ///
    /// # Arguments
    /// * `input_path` - File to read from
    /// * `image_index` - Image within the dataset
    /// * `plane_index` - Plane within the image
    pub fn read_plane(&self, input_path: &Path, image_index: usize, plane_index: usize) -> FormatResult<Vec<u8>> {
        let mut reader = self.open(input_path)?;
        let plane = reader.read_plane(image_index, plane_index);
        reader.close();
        plane
    }

    /// Copies every plane of every image into a file of another format
    ///
    /// The output format is chosen by the output file suffix.
    ///
    /// # Arguments
    /// * `input_path` - File to read
    /// * `output_path` - File to create
    /// * `options` - Compression and ordering settings for the writer
    ///
    /// # Returns
    /// The metadata that was written
    pub fn convert(&self, input_path: &Path, output_path: &Path, options: &WriterOptions) -> FormatResult<Metadata> {
        let suffix = output_path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                FormatError::UnsupportedFormat(format!("{} has no file suffix", output_path.display()))
            })?;
        let target = self.format_by_name(suffix)?;

        let mut reader = self.open(input_path)?;
        let mut metadata = reader.metadata()?.clone();
        metadata.format_name = target.name().to_string();

        let mut writer = target.create_writer();
        let mut options = options.clone();
        options.sequential = true;
        writer.apply_options(&options)?;
        writer.set_metadata(metadata)?;
        writer.set_dest_path(output_path)?;

        let copied = copy_planes(reader.as_mut(), writer.as_mut());
        reader.close();
        let closed = writer.close();
        let planes = copied?;
        closed?;

        info!(
            "Converted {} planes from {} to {}",
            planes,
            input_path.display(),
            output_path.display()
        );
        Ok(writer.metadata()?.clone())
    }

    /// Writes the raw bytes of one plane to a file
    ///
    /// # Returns
    /// The number of bytes written
    pub fn export_plane(
        &self,
        input_path: &Path,
        image_index: usize,
        plane_index: usize,
        output_path: &Path,
    ) -> FormatResult<usize> {
        let plane = self.read_plane(input_path, image_index, plane_index)?;
        fs::write(output_path, &plane)?;
        info!(
            "Wrote plane {} of image {} ({} bytes) to {}",
            plane_index,
            image_index,
            plane.len(),
            output_path.display()
        );
        Ok(plane.len())
    }

    fn format_by_name(&self, name: &str) -> FormatResult<&dyn FormatHandle> {
        self.registry.get(name).ok_or_else(|| {
            FormatError::UnsupportedFormat(format!(
                "unknown format '{}', expected one of: {}",
                name,
                self.registry.names().join(", ")
            ))
        })
    }
}

/// Streams every plane from a reader into a bound writer, in order
fn copy_planes(reader: &mut dyn PlaneReader, writer: &mut dyn PlaneWriter) -> FormatResult<usize> {
    let mut planes = 0;
    for image_index in 0..reader.image_count()? {
        for plane_index in 0..reader.plane_count(image_index)? {
            let plane = reader.read_plane(image_index, plane_index)?;
            writer.write_plane(image_index, plane_index, &plane)?;
            planes += 1;
        }
    }
    Ok(planes)
}

/// Formats a dataset description followed by the annotations of each image
pub fn describe_metadata(metadata: &Metadata) -> String {
    let mut text = metadata.to_string();
    if !metadata.table.is_empty() {
        text.push_str("\nDataset annotations:\n");
        text.push_str(&metadata.table.to_string());
    }
    for (i, image) in metadata.images.iter().enumerate() {
        if image.table.is_empty() {
            continue;
        }
        text.push_str(&format!("\nAnnotations of image #{}:\n", i));
        text.push_str(&image.table.to_string());
    }
    text
}
