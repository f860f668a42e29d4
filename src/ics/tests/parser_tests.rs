//! Tests for ICS header parsing

extern crate std;

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::format::errors::FormatError;
use crate::format::parser::Parser;
use crate::ics::parser::{resolve_pixel_kind, IcsParser};
use crate::ics::tests::test_utils::{v1_source, v2_source};
use crate::metadata::PixelKind;

#[test]
fn test_parse_version_one_geometry() {
    let source = v1_source(
        &[
            "filename\tcells",
            "layout\tparameters\t6",
            "layout\torder\tbits\tx\ty\tz\tch\tt",
            "layout\tsizes\t16\t64\t64\t5\t3\t10",
            "representation\tformat\tinteger",
            "representation\tsign\tunsigned",
            "representation\tbyte_order\t1\t2",
        ],
        std::vec![0u8; 16],
    );
    let (meta, _) = IcsParser::new().parse(source).unwrap();
    let image = &meta.core.images[0];

    std::assert!(!meta.version_two);
    std::assert_eq!(meta.pixel_offset, 0);
    std::assert_eq!((image.size_x(), image.size_y()), (64, 64));
    std::assert_eq!((image.size_z(), image.size_c(), image.size_t()), (5, 3, 10));
    std::assert_eq!(image.plane_count(), 150);
    std::assert_eq!(image.pixel_kind, Some(PixelKind::Uint16));
    std::assert!(image.little_endian);
    std::assert!(!image.rgb);
    std::assert_eq!(image.dimension_order_string(), "XYZCT");
    std::assert_eq!(image.name.as_deref(), Some("cells"));
    std::assert_eq!(
        image.table.get("layout sizes").and_then(|v| v.as_str()),
        Some("16 64 64 5 3 10")
    );
}

#[test]
fn test_bits_from_significant_bits() {
    let source = v2_source(
        &[
            "layout\torder\tx\ty\tz\tch\tt",
            "layout\tsizes\t64\t64\t5\t3\t10",
            "layout\tsignificant_bits\t16",
            "representation\tformat\tinteger",
        ],
        &[],
    );
    let (meta, _) = IcsParser::new().parse(source).unwrap();
    std::assert_eq!(meta.bits_per_pixel, 16);
    std::assert_eq!(meta.core.images[0].plane_count(), 150);
    std::assert_eq!(meta.core.images[0].pixel_kind, Some(PixelKind::Uint16));
}

#[test]
fn test_missing_axes_default_to_one() {
    let source = v2_source(
        &[
            "layout\torder\tbits\tx\ty\tz\tch",
            "layout\tsizes\t8\t4\t4\t2\t3",
            "representation\tformat\tinteger",
        ],
        &[],
    );
    let (meta, _) = IcsParser::new().parse(source).unwrap();
    let image = &meta.core.images[0];
    std::assert_eq!(image.size_t(), 1);
    std::assert_eq!(image.plane_count(), 6);
    std::assert_eq!(image.dimension_order_string(), "XYZCT");
}

#[test]
fn test_leading_channels_are_rgb() {
    let source = v2_source(
        &[
            "layout\torder\tbits\tch\tx\ty",
            "layout\tsizes\t8\t3\t16\t16",
            "representation\tformat\tinteger",
        ],
        &[],
    );
    let (meta, _) = IcsParser::new().parse(source).unwrap();
    let image = &meta.core.images[0];
    std::assert!(image.rgb);
    std::assert!(image.interleaved);
    std::assert_eq!(image.size_c(), 3);
    std::assert_eq!(image.plane_count(), 1);
}

#[test]
fn test_many_leading_channels_are_not_rgb() {
    let source = v2_source(
        &[
            "layout\torder\tbits\tch\tx\ty\tz",
            "layout\tsizes\t8\t6\t4\t4\t2",
            "representation\tformat\tinteger",
        ],
        &[],
    );
    let (meta, _) = IcsParser::new().parse(source).unwrap();
    let image = &meta.core.images[0];
    std::assert!(!image.rgb);
    std::assert!(meta.channels_interleaved);
    std::assert_eq!(image.plane_count(), 12);
}

#[test]
fn test_byte_order_rules() {
    let header = |format: &str, bits: &str, order: &str| {
        let lines = [
            std::format!("layout\torder\tbits\tx\ty"),
            std::format!("layout\tsizes\t{}\t2\t2", bits),
            std::format!("representation\tformat\t{}", format),
            std::format!("representation\tbyte_order\t{}", order),
        ];
        let refs: std::vec::Vec<&str> = lines.iter().map(|l| l.as_str()).collect();
        let (meta, _) = IcsParser::new().parse(v2_source(&refs, &[])).unwrap();
        meta.core.images[0].little_endian
    };

    std::assert!(!header("integer", "32", "1\t2\t3\t4"));
    std::assert!(header("integer", "32", "4\t3\t2\t1"));
    std::assert!(header("real", "32", "1\t2\t3\t4"));
    std::assert!(!header("real", "32", "4\t3\t2\t1"));
    std::assert!(header("integer", "16", "1\t2"));
    std::assert!(!header("integer", "16", "2\t1"));
}

#[test]
fn test_missing_layout_is_corrupt() {
    let source = v2_source(&["layout\torder\tbits\tx\ty", "representation\tformat\tinteger"], &[]);
    std::assert!(std::matches!(
        IcsParser::new().parse(source),
        Err(FormatError::CorruptHeader(_))
    ));
}

#[test]
fn test_non_numeric_size_is_corrupt() {
    let source = v2_source(
        &[
            "layout\torder\tbits\tx\ty",
            "layout\tsizes\t8\tmany\t2",
            "representation\tformat\tinteger",
        ],
        &[],
    );
    std::assert!(std::matches!(
        IcsParser::new().parse(source),
        Err(FormatError::CorruptHeader(_))
    ));
}

#[test]
fn test_oversized_geometry_rejected() {
    let source = v2_source(
        &[
            "layout\torder\tbits\tx\ty\tz\tch\tt",
            "layout\tsizes\t16\t2\t2\t1073741824\t1073741824\t1073741824",
            "representation\tformat\tinteger",
            "representation\tcompression\tgzip",
        ],
        &[0u8; 8],
    );
    std::assert!(std::matches!(
        IcsParser::new().parse(source),
        Err(FormatError::UnsupportedDimensionality(_))
    ));
}

#[test]
fn test_resolve_pixel_kind() {
    std::assert_eq!(resolve_pixel_kind("integer", 12, false).unwrap(), PixelKind::Uint16);
    std::assert_eq!(resolve_pixel_kind("integer", 24, false).unwrap(), PixelKind::Uint8);
    std::assert_eq!(resolve_pixel_kind("integer", 48, true).unwrap(), PixelKind::Int16);
    std::assert_eq!(resolve_pixel_kind("integer", 32, true).unwrap(), PixelKind::Int32);
    std::assert_eq!(resolve_pixel_kind("real", 64, true).unwrap(), PixelKind::Float64);
    std::assert!(std::matches!(
        resolve_pixel_kind("real", 16, true),
        Err(FormatError::UnsupportedDimensionality(_))
    ));
    std::assert!(std::matches!(
        resolve_pixel_kind("integer", 64, false),
        Err(FormatError::UnsupportedDimensionality(_))
    ));
}

#[test]
fn test_version_one_needs_data_stream() {
    let header = crate::ics::tests::test_utils::header_text("1.0", &["layout\torder\tbits\tx\ty"]);
    let source = crate::format::parser::ParseSource::from_stream(std::boxed::Box::new(std::io::Cursor::new(
        header.into_bytes(),
    )))
    .with_name("scan.ics");
    match IcsParser::new().parse(source) {
        Err(FormatError::MissingCompanionFile(path)) => {
            std::assert_eq!(path, std::path::PathBuf::from("scan.ids"))
        }
        other => std::panic!("unexpected result: {:?}", other.map(|(meta, _)| meta)),
    }
}

#[test]
fn test_history_and_annotations() {
    let source = v2_source(
        &[
            "layout\torder\tbits\tx\ty\tz\tch\tt",
            "layout\tsizes\t8\t4\t4\t2\t3\t1",
            "representation\tformat\tinteger",
            "parameter\tscale\t1.0\t0.5\t0.25\t2.0\t1.0\t3.0",
            "sensor\ts_params\tLambdaEm\t520.7\t600",
            "history\tfirst note",
            "history\ttext\tsecond note",
            "history\tgain1\t2.5",
            "history\tlaser1\twavelength\t488nm",
            "history\tauthor\tLab",
            "history\tdate\tMonday, February 21, 2005 14:33:12 GMT",
        ],
        &[],
    );
    let (meta, _) = IcsParser::new().parse(source).unwrap();
    let notes = &meta.annotations;

    std::assert_eq!(notes.history, "first note\nsecond note\n");
    std::assert_eq!(
        meta.core.images[0].table.get("history text").and_then(|v| v.as_str()),
        Some("first note\nsecond note\n")
    );
    std::assert!(!meta.core.images[0].table.contains_key("history"));
    std::assert_eq!(notes.physical_size_x, Some(0.5));
    std::assert_eq!(notes.physical_size_y, Some(0.25));
    std::assert_eq!(notes.physical_size_z, Some(2.0));
    std::assert_eq!(notes.time_increment, Some(3.0));
    std::assert_eq!(notes.emission_wavelengths, std::vec![520, 600, 0]);
    std::assert_eq!(notes.detector_gains.get(&1), Some(&2.5));
    std::assert_eq!(notes.laser_wavelengths.get(&1), Some(&488));
    std::assert_eq!(notes.author.as_deref(), Some("Lab"));
    std::assert_eq!(notes.creation_date.as_deref(), Some("2005-02-21T14:33:12"));
}

#[test]
fn test_unparseable_date_falls_back() {
    let source = v2_source(
        &[
            "layout\torder\tbits\tx\ty",
            "layout\tsizes\t8\t2\t2",
            "representation\tformat\tinteger",
            "history\tdate\tsometime last week",
        ],
        &[],
    );
    let (meta, _) = IcsParser::new().parse(source).unwrap();
    std::assert!(meta.annotations.creation_date.is_some());
}

#[test]
fn test_svi_software_inverts_rows() {
    let source = v2_source(
        &[
            "layout\torder\tbits\tx\ty",
            "layout\tsizes\t8\t2\t2",
            "representation\tformat\tinteger",
            "history\tsoftware\tSVI Huygens",
        ],
        &[],
    );
    let (meta, _) = IcsParser::new().parse(source).unwrap();
    std::assert!(meta.invert_y);
    std::assert_eq!(meta.annotations.software.as_deref(), Some("SVI Huygens"));
}

#[test]
fn test_gzip_tag_with_raw_sized_payload() {
    let lines = [
        "layout\torder\tbits\tx\ty",
        "layout\tsizes\t8\t4\t4",
        "representation\tformat\tinteger",
        "representation\tcompression\tgzip",
    ];
    let (meta, _) = IcsParser::new().parse(v2_source(&lines, &[7u8; 16])).unwrap();
    std::assert!(!meta.is_decompressed());
}

#[test]
fn test_gzip_payload_is_decompressed() {
    let raw: std::vec::Vec<u8> = (0..4096).map(|i| (i % 16) as u8).collect();
    let mut encoder = GzEncoder::new(std::vec::Vec::new(), Compression::default());
    encoder.write_all(&raw).unwrap();
    let packed = encoder.finish().unwrap();
    let lines = [
        "layout\torder\tbits\tx\ty",
        "layout\tsizes\t8\t64\t64",
        "representation\tformat\tinteger",
        "representation\tcompression\tgzip",
    ];
    let (meta, _) = IcsParser::new().parse(v2_source(&lines, &packed)).unwrap();
    std::assert_eq!(meta.payload.as_deref(), Some(&raw));
}
