//! Tests for image and dataset metadata

extern crate std;

use crate::format::errors::FormatError;
use crate::metadata::{Axis, ImageMetadata, Metadata, PixelKind};

#[test]
fn test_defaults() {
    let image = ImageMetadata::new();
    std::assert_eq!((image.size_x(), image.size_y()), (0, 0));
    std::assert_eq!((image.size_z(), image.size_c(), image.size_t()), (1, 1, 1));
    std::assert!(std::matches!(image.validate(), Err(FormatError::CorruptHeader(_))));
    std::assert!(std::matches!(image.bytes_per_pixel(), Err(FormatError::NotConfigured(_))));
}

#[test]
fn test_plane_count_and_rgb() {
    let mut image = ImageMetadata::with_geometry([16, 8, 5, 3, 10], PixelKind::Uint16);
    std::assert_eq!(image.plane_count(), 150);
    std::assert_eq!(image.plane_byte_count().unwrap(), 16 * 8 * 2);

    image.rgb = true;
    std::assert!(image.is_rgb());
    std::assert_eq!(image.plane_count(), 50);
    std::assert_eq!(image.rgb_channel_count(), 3);
    std::assert_eq!(image.pixel_stride().unwrap(), 6);

    image.set_axis_length(Axis::Channel, 6);
    std::assert!(!image.is_rgb());
    std::assert_eq!(image.rgb_channel_count(), 1);
    std::assert_eq!(image.plane_count(), 300);
}

#[test]
fn test_validate_rejects_zero_axes() {
    let mut image = ImageMetadata::with_geometry([4, 4, 1, 1, 1], PixelKind::Int8);
    std::assert!(image.validate().is_ok());
    image.set_axis_length(Axis::Time, 0);
    std::assert!(std::matches!(image.validate(), Err(FormatError::CorruptHeader(_))));
}

#[test]
fn test_validate_rejects_unaddressable_size() {
    let huge = 1usize << 30;
    let image = ImageMetadata::with_geometry([2, 2, huge, huge, huge], PixelKind::Uint8);
    std::assert!(std::matches!(image.validate(), Err(FormatError::UnsupportedDimensionality(_))));

    let image = ImageMetadata::with_geometry([usize::MAX, 2, 1, 1, 1], PixelKind::Uint16);
    std::assert!(std::matches!(image.validate(), Err(FormatError::UnsupportedDimensionality(_))));
}

#[test]
fn test_dimension_order_string() {
    let mut image = ImageMetadata::new();
    image.dimension_order = std::vec![Axis::X, Axis::Y, Axis::Channel, Axis::Z, Axis::Time];
    std::assert_eq!(image.dimension_order_string(), "XYCZT");
}

#[test]
fn test_dataset_indexing() {
    let mut dataset = Metadata::single("test", ImageMetadata::with_geometry([2, 2, 3, 1, 1], PixelKind::Uint8));
    std::assert_eq!(dataset.image_count(), 1);
    std::assert_eq!(dataset.plane_count(0).unwrap(), 3);
    std::assert!(std::matches!(dataset.image(1), Err(FormatError::IndexOutOfRange(_))));
    dataset.image_mut(0).unwrap().name = Some("renamed".to_string());
    std::assert!(std::format!("{}", dataset).contains("renamed"));

    std::assert!(std::matches!(
        Metadata::new("empty").validate(),
        Err(FormatError::CorruptHeader(_))
    ));
}
