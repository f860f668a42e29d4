//! Shared ICS fixtures

use std::io::Cursor;

use crate::format::parser::ParseSource;

/// Header text with separator line, version line and `end`
pub fn header_text(version: &str, lines: &[&str]) -> String {
    let mut text = String::from("\t\n");
    text.push_str(&format!("ics_version\t{}\n", version));
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("end\n");
    text
}

/// Version 1 header with a separate data stream
pub fn v1_source(lines: &[&str], data: Vec<u8>) -> ParseSource {
    let header = header_text("1.0", lines).into_bytes();
    ParseSource::from_stream(Box::new(Cursor::new(header))).with_data(Box::new(Cursor::new(data)))
}

/// Self-contained version 2.0 file
pub fn v2_bytes(lines: &[&str], payload: &[u8]) -> Vec<u8> {
    let mut bytes = header_text("2.0", lines).into_bytes();
    bytes.extend_from_slice(payload);
    bytes
}

/// Self-contained version 2.0 source
pub fn v2_source(lines: &[&str], payload: &[u8]) -> ParseSource {
    ParseSource::from_stream(Box::new(Cursor::new(v2_bytes(lines, payload))))
}

/// Payload where every byte encodes its own offset
pub fn counting_payload(length: usize) -> Vec<u8> {
    (0..length).map(|i| (i % 251) as u8).collect()
}
