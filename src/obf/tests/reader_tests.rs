//! Tests for OBF plane reading

extern crate std;

use crate::format::errors::FormatError;
use crate::format::parser::{ParseSource, Parser};
use crate::format::reader::PlaneReader;
use crate::format::region::Region;
use crate::obf::constants::pixel_types;
use crate::obf::parser::ObfParser;
use crate::obf::reader::ObfReader;
use crate::obf::tests::test_utils::{obf_cursor, planes_filled, StackFixture};

fn bound_reader(version: i32, stacks: &[StackFixture]) -> ObfReader {
    let source = ParseSource::from_stream(std::boxed::Box::new(obf_cursor(version, stacks)));
    let (meta, stream) = ObfParser::new().parse(source).unwrap();
    let mut reader = ObfReader::new();
    reader.bind(meta, stream);
    reader
}

fn counting(length: usize) -> std::vec::Vec<u8> {
    (0..length).map(|i| (i * 3 % 256) as u8).collect()
}

#[test]
fn test_uncompressed_planes_and_regions() {
    let data = counting(4 * 3 * 2 * 2);
    let mut reader = bound_reader(1, &[StackFixture::raw(&[4, 3, 2], pixel_types::INT16, data.clone())]);

    std::assert_eq!(reader.read_plane(0, 1).unwrap(), data[24..].to_vec());
    let region = reader.read_region(0, 1, Region::new(2, 1, 2, 2)).unwrap();
    let plane = &data[24..];
    let mut expected = std::vec::Vec::new();
    expected.extend_from_slice(&plane[(4 + 2) * 2..(4 + 4) * 2]);
    expected.extend_from_slice(&plane[(8 + 2) * 2..(8 + 4) * 2]);
    std::assert_eq!(region, expected);
}

#[test]
fn test_compressed_replay_after_reset() {
    let plain = planes_filled(6, 3);
    let mut reader = bound_reader(1, &[StackFixture::zlib(&[3, 2, 3], pixel_types::UINT8, &plain)]);

    let first = reader.read_plane(0, 0).unwrap();
    std::assert_eq!(first, std::vec![1u8; 6]);
    std::assert_eq!(reader.read_plane(0, 1).unwrap(), std::vec![2u8; 6]);
    std::assert_eq!(reader.read_plane(0, 2).unwrap(), std::vec![3u8; 6]);
    std::assert_eq!(reader.cached_frame(), Some((0, 2)));

    std::assert_eq!(reader.read_plane(0, 0).unwrap(), first);
    std::assert_eq!(reader.cached_frame(), Some((0, 0)));
}

#[test]
fn test_compressed_skip_ahead_and_region() {
    let plain: std::vec::Vec<u8> = (0..4 * 4 * 3).map(|i| i as u8).collect();
    let mut reader = bound_reader(0, &[StackFixture::zlib(&[4, 4, 1, 3], pixel_types::UINT8, &plain)]);

    let region = reader.read_region(0, 2, Region::new(1, 2, 2, 2)).unwrap();
    std::assert_eq!(region, std::vec![41, 42, 45, 46]);
    std::assert_eq!(reader.plane_count(0).unwrap(), 3);
}

#[test]
fn test_interleaved_stacks() {
    let first = StackFixture::zlib(&[2, 2, 2], pixel_types::UINT8, &planes_filled(4, 2));
    let second = StackFixture::zlib(&[2, 2, 2], pixel_types::UINT8, &[9, 9, 9, 9, 8, 8, 8, 8]);
    let raw = StackFixture::raw(&[2, 2], pixel_types::UINT8, std::vec![5, 6, 7, 8]);
    let mut reader = bound_reader(1, &[first, second, raw]);

    std::assert_eq!(reader.read_plane(0, 1).unwrap(), std::vec![2u8; 4]);
    std::assert_eq!(reader.read_plane(2, 0).unwrap(), std::vec![5, 6, 7, 8]);
    std::assert_eq!(reader.read_plane(1, 1).unwrap(), std::vec![8u8; 4]);
    std::assert_eq!(reader.read_plane(0, 0).unwrap(), std::vec![1u8; 4]);
    std::assert_eq!(reader.read_plane(0, 1).unwrap(), std::vec![2u8; 4]);
}

#[test]
fn test_short_compressed_stack() {
    let plain = planes_filled(16, 2);
    let mut stack = StackFixture::zlib(&[4, 4, 2], pixel_types::UINT8, &plain);
    stack.declared_length = Some(4);
    let mut reader = bound_reader(0, &[stack]);

    std::assert!(std::matches!(reader.read_plane(0, 1), Err(FormatError::CorruptData(_))));
    std::assert_eq!(reader.cached_frame(), None);
}

#[test]
fn test_stream_ends_before_frame() {
    let mut reader = bound_reader(1, &[StackFixture::zlib(&[4, 4, 2], pixel_types::UINT8, &[1u8; 16])]);
    std::assert_eq!(reader.read_plane(0, 0).unwrap(), std::vec![1u8; 16]);
    std::assert!(std::matches!(reader.read_plane(0, 1), Err(FormatError::CorruptData(_))));
}

#[test]
fn test_validation_before_io() {
    let mut reader = bound_reader(1, &[StackFixture::raw(&[2, 2], pixel_types::UINT8, std::vec![0u8; 4])]);
    std::assert!(std::matches!(reader.read_plane(0, 1), Err(FormatError::IndexOutOfRange(_))));
    std::assert!(std::matches!(
        reader.read_region(0, 0, Region::new(0, 0, 0, 2)),
        Err(FormatError::IndexOutOfRange(_))
    ));
    let mut small = [0u8; 3];
    std::assert!(std::matches!(
        reader.open_region(0, 0, Region::new(0, 0, 2, 2), &mut small),
        Err(FormatError::BufferTooSmall { required: 4, actual: 3 })
    ));

    reader.close();
    std::assert!(std::matches!(reader.read_plane(0, 0), Err(FormatError::NotConfigured(_))));
    std::assert_eq!(reader.cached_frame(), None);
}
