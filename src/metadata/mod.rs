//! Structural image metadata
//!
//! This module holds the format-independent description of a dataset: one
//! [`ImageMetadata`] per logical image (axis extents, pixel kind, byte order
//! and layout flags) plus free-form [`MetaTable`] annotations.

pub mod axis;
pub mod pixel;
pub mod table;
pub mod image;
pub mod dataset;
#[cfg(test)]
mod tests;

pub use axis::Axis;
pub use pixel::PixelKind;
pub use table::{MetaTable, MetaValue};
pub use image::ImageMetadata;
pub use dataset::Metadata;
