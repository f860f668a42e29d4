//! Tests for OBF header parsing and detection

extern crate std;

use std::io::{Cursor, Seek, SeekFrom};

use crate::format::checker::Checker;
use crate::format::errors::FormatError;
use crate::format::parser::{ParseSource, Parser};
use crate::metadata::{MetaValue, PixelKind};
use crate::obf::checker::ObfChecker;
use crate::obf::constants::pixel_types;
use crate::obf::metadata::ObfMetadata;
use crate::obf::parser::ObfParser;
use crate::obf::tests::test_utils::{build_obf, obf_cursor, StackFixture};

fn parse(bytes: Cursor<std::vec::Vec<u8>>) -> crate::format::errors::FormatResult<ObfMetadata> {
    ObfParser::new()
        .parse(ParseSource::from_stream(std::boxed::Box::new(bytes)))
        .map(|(meta, _)| meta)
}

#[test]
fn test_parse_two_stacks() {
    let first = StackFixture::raw(&[4, 3, 2], pixel_types::UINT16, std::vec![0u8; 48]);
    let mut second = StackFixture::zlib(&[2, 2], pixel_types::FLOAT32, &[0u8; 16]);
    second.name = "second".to_string();
    let bytes = build_obf(1, "sample", &[first, second]);
    let meta = parse(Cursor::new(bytes)).unwrap();

    std::assert_eq!(meta.file_version, 1);
    std::assert_eq!(meta.core.image_count(), 2);
    std::assert_eq!(meta.core.table.get("Description").and_then(MetaValue::as_str), Some("sample"));

    let image = &meta.core.images[0];
    std::assert_eq!((image.size_x(), image.size_y(), image.size_z()), (4, 3, 2));
    std::assert_eq!((image.size_c(), image.size_t()), (1, 1));
    std::assert_eq!(image.plane_count(), 2);
    std::assert_eq!(image.pixel_kind, Some(PixelKind::Uint16));
    std::assert!(image.little_endian);
    std::assert!(!image.order_certain);
    std::assert_eq!(image.name.as_deref(), Some("stack"));

    let stack = meta.stacks[0];
    std::assert_eq!(stack.position, 26 + 6 + 368 + 5);
    std::assert_eq!(stack.length, 48);
    std::assert!(!stack.compressed);
    std::assert!(meta.stacks[1].compressed);
    std::assert_eq!(meta.core.images[1].name.as_deref(), Some("second"));
    std::assert_eq!(meta.core.images[1].pixel_kind, Some(PixelKind::Float32));
}

#[test]
fn test_footer_tables() {
    let stack = StackFixture::raw(&[4, 3], pixel_types::UINT8, std::vec![0u8; 12]);
    let meta = parse(obf_cursor(1, &[stack])).unwrap();
    let table = &meta.core.images[0].table;

    let labels: std::vec::Vec<&str> = table
        .get("Labels")
        .and_then(MetaValue::as_list)
        .unwrap()
        .iter()
        .filter_map(MetaValue::as_str)
        .collect();
    std::assert_eq!(labels, std::vec!["d0", "d1"]);

    let steps = table.get("Steps").and_then(MetaValue::as_list).unwrap();
    std::assert_eq!(steps.len(), 2);
    let first: std::vec::Vec<f64> = steps[0].as_list().unwrap().iter().filter_map(MetaValue::as_f64).collect();
    std::assert_eq!(first, std::vec![0.0, 0.5, 1.0, 1.5]);
    std::assert!(steps[1].as_list().unwrap().is_empty());

    let lengths: std::vec::Vec<f64> = table
        .get("Lengths")
        .and_then(MetaValue::as_list)
        .unwrap()
        .iter()
        .filter_map(MetaValue::as_f64)
        .collect();
    std::assert_eq!(lengths, std::vec![1.0, 2.0]);
}

#[test]
fn test_version_zero_has_no_footer() {
    let stack = StackFixture::raw(&[2, 2], pixel_types::INT8, std::vec![0u8; 4]);
    let meta = parse(obf_cursor(0, &[stack])).unwrap();
    std::assert_eq!(meta.file_version, 0);
    std::assert!(!meta.core.images[0].table.contains_key("Labels"));
    std::assert_eq!(meta.core.images[0].pixel_kind, Some(PixelKind::Int8));
}

#[test]
fn test_six_dimensions_rejected() {
    let stack = StackFixture::raw(&[2, 2, 1, 1, 1, 2], pixel_types::UINT8, std::vec![0u8; 8]);
    std::assert!(std::matches!(
        parse(obf_cursor(1, &[stack])),
        Err(FormatError::UnsupportedDimensionality(_))
    ));
}

#[test]
fn test_oversized_geometry_rejected() {
    let huge = 1 << 30;
    let stack = StackFixture::raw(&[2, 2, huge, huge, huge], pixel_types::UINT8, std::vec![0u8; 4]);
    std::assert!(std::matches!(
        parse(obf_cursor(0, &[stack])),
        Err(FormatError::UnsupportedDimensionality(_))
    ));
}

/// Overwrites the little-endian i32 at `offset`
fn patch_i32(bytes: &mut [u8], offset: usize, value: i32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[test]
fn test_text_lengths_past_end_of_file() {
    // Stack record at 35; its name length sits 336 bytes in
    let stack = StackFixture::raw(&[2, 2], pixel_types::UINT8, std::vec![0u8; 4]);
    let mut bytes = build_obf(0, "test file", &[stack]);
    patch_i32(&mut bytes, 35 + 336, i32::MAX);
    std::assert!(std::matches!(parse(Cursor::new(bytes)), Err(FormatError::CorruptHeader(_))));

    let stack = StackFixture::raw(&[2, 2], pixel_types::UINT8, std::vec![0u8; 4]);
    let mut bytes = build_obf(0, "test file", &[stack]);
    patch_i32(&mut bytes, 35 + 340, 1 << 20);
    std::assert!(std::matches!(parse(Cursor::new(bytes)), Err(FormatError::CorruptHeader(_))));

    // First dimension label of the footer following the 5 byte name and 4 data bytes
    let stack = StackFixture::raw(&[2, 2], pixel_types::UINT8, std::vec![0u8; 4]);
    let mut bytes = build_obf(1, "test file", &[stack]);
    let footer = 35 + 368 + 5 + 4;
    std::assert_eq!(&bytes[footer + 124 + 4..footer + 124 + 6], b"d0");
    patch_i32(&mut bytes, footer + 124, i32::MAX);
    std::assert!(std::matches!(parse(Cursor::new(bytes)), Err(FormatError::CorruptHeader(_))));
}

#[test]
fn test_negative_values_are_corrupt() {
    let mut stack = StackFixture::raw(&[2, 2], pixel_types::UINT8, std::vec![0u8; 4]);
    stack.declared_length = Some(-4);
    std::assert!(std::matches!(parse(obf_cursor(1, &[stack])), Err(FormatError::CorruptHeader(_))));

    let mut stack = StackFixture::raw(&[2, 2], pixel_types::UINT8, std::vec![0u8; 4]);
    stack.dimensions = -1;
    std::assert!(std::matches!(parse(obf_cursor(0, &[stack])), Err(FormatError::CorruptHeader(_))));

    let stack = StackFixture::raw(&[0, 2], pixel_types::UINT8, std::vec![]);
    std::assert!(std::matches!(parse(obf_cursor(0, &[stack])), Err(FormatError::CorruptHeader(_))));
}

#[test]
fn test_unknown_codes() {
    let stack = StackFixture::raw(&[2, 2], 0x100, std::vec![0u8; 4]);
    std::assert!(std::matches!(
        parse(obf_cursor(0, &[stack])),
        Err(FormatError::UnsupportedDimensionality(_))
    ));

    let mut stack = StackFixture::raw(&[2, 2], pixel_types::UINT8, std::vec![0u8; 4]);
    stack.compression = 2;
    std::assert!(std::matches!(
        parse(obf_cursor(0, &[stack])),
        Err(FormatError::UnsupportedCompression(_))
    ));
}

#[test]
fn test_file_version_and_magic() {
    let stack = StackFixture::raw(&[2, 2], pixel_types::UINT8, std::vec![0u8; 4]);
    std::assert!(std::matches!(
        parse(obf_cursor(2, &[stack])),
        Err(FormatError::UnsupportedVersion(2))
    ));
    std::assert!(std::matches!(
        parse(Cursor::new(b"NOT_OBF\nxxxxxxxxxxxxxxxxxx".to_vec())),
        Err(FormatError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_stack_chain_loop() {
    let mut stack = StackFixture::raw(&[2, 2], pixel_types::UINT8, std::vec![0u8; 4]);
    stack.next = Some(26 + 9);
    std::assert!(std::matches!(parse(obf_cursor(0, &[stack])), Err(FormatError::CorruptHeader(_))));
}

#[test]
fn test_checker_detects_magic_and_restores_position() {
    let checker = ObfChecker;
    let mut stream = obf_cursor(1, &[StackFixture::raw(&[2, 2], pixel_types::UINT8, std::vec![0u8; 4])]);
    stream.seek(SeekFrom::Start(5)).unwrap();
    std::assert!(checker.is_format(&mut stream));
    std::assert_eq!(stream.position(), 5);

    let mut newer = obf_cursor(2, &[]);
    std::assert!(!checker.is_format(&mut newer));
    let mut short = Cursor::new(b"OMAS".to_vec());
    std::assert!(!checker.is_format(&mut short));
    std::assert!(!checker.suffix_sufficient());
    std::assert!(checker.has_suffix(std::path::Path::new("scan.MSR")));
}
