//! Dataset level metadata

use std::fmt;

use crate::format::errors::{FormatError, FormatResult};
use crate::metadata::image::ImageMetadata;
use crate::metadata::table::MetaTable;

/// Description of every image in one dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Name of the format that produced this metadata
    pub format_name: String,
    /// Name of the dataset, usually the file it was read from
    pub dataset_name: Option<String>,
    /// Images in file order
    pub images: Vec<ImageMetadata>,
    /// Annotations that apply to the whole dataset
    pub table: MetaTable,
}

impl Metadata {
    /// Creates an empty dataset description for a format
    pub fn new(format_name: &str) -> Self {
        Metadata {
            format_name: format_name.to_string(),
            ..Default::default()
        }
    }

    /// Creates a dataset holding a single image
    pub fn single(format_name: &str, image: ImageMetadata) -> Self {
        let mut meta = Self::new(format_name);
        meta.images.push(image);
        meta
    }

    /// Number of images
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Metadata of one image
    pub fn image(&self, image_index: usize) -> FormatResult<&ImageMetadata> {
        self.images.get(image_index).ok_or_else(|| {
            FormatError::IndexOutOfRange(format!(
                "image index {} must be < {}",
                image_index,
                self.images.len()
            ))
        })
    }

    /// Mutable metadata of one image
    pub fn image_mut(&mut self, image_index: usize) -> FormatResult<&mut ImageMetadata> {
        let count = self.images.len();
        self.images.get_mut(image_index).ok_or_else(|| {
            FormatError::IndexOutOfRange(format!("image index {} must be < {}", image_index, count))
        })
    }

    /// Number of planes in one image
    pub fn plane_count(&self, image_index: usize) -> FormatResult<usize> {
        Ok(self.image(image_index)?.plane_count())
    }

    /// Validates every image
    pub fn validate(&self) -> FormatResult<()> {
        if self.images.is_empty() {
            return Err(FormatError::CorruptHeader("dataset has no images".to_string()));
        }
        for image in &self.images {
            image.validate()?;
        }
        Ok(())
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format: {}", self.format_name)?;
        if let Some(name) = &self.dataset_name {
            writeln!(f, "Dataset: {}", name)?;
        }
        writeln!(f, "Images: {}", self.images.len())?;
        for (i, image) in self.images.iter().enumerate() {
            writeln!(f, "\nImage #{}", i)?;
            write!(f, "{}", image)?;
        }
        Ok(())
    }
}
