//! In-memory OBF fixtures

use std::io::{Cursor, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// One stack of a synthetic file
pub struct StackFixture {
    pub dimensions: i32,
    pub sizes: Vec<i32>,
    pub type_code: i32,
    pub compression: i32,
    pub name: String,
    pub data: Vec<u8>,
    /// Declared payload length, defaults to `data.len()`
    pub declared_length: Option<i64>,
    /// Next stack position, defaults to the following stack
    pub next: Option<i64>,
}

impl StackFixture {
    /// Uncompressed stack with the given sizes and pixel type
    pub fn raw(sizes: &[i32], type_code: i32, data: Vec<u8>) -> Self {
        StackFixture {
            dimensions: sizes.len() as i32,
            sizes: sizes.to_vec(),
            type_code,
            compression: 0,
            name: "stack".to_string(),
            data,
            declared_length: None,
            next: None,
        }
    }

    /// Zlib stack holding the compressed form of `plain`
    pub fn zlib(sizes: &[i32], type_code: i32, plain: &[u8]) -> Self {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(plain).unwrap();
        let mut fixture = StackFixture::raw(sizes, type_code, encoder.finish().unwrap());
        fixture.compression = 1;
        fixture
    }

    fn record_len(&self, version: i32) -> u64 {
        let header = 368 + self.name.len() as u64;
        let footer = if version >= 1 { self.footer().len() as u64 } else { 0 };
        header + self.data.len() as u64 + footer
    }

    /// Footer with labels "d0", "d1", ... and steps for the first dimension
    fn footer(&self) -> Vec<u8> {
        let dimensions = self.dimensions.max(0) as usize;
        let mut out = Vec::new();
        out.write_i32::<LittleEndian>(124).unwrap();
        for slot in 0..15 {
            out.write_i32::<LittleEndian>(if slot == 0 { 1 } else { 0 }).unwrap();
        }
        for _ in 0..15 {
            out.write_i32::<LittleEndian>(0).unwrap();
        }
        for dimension in 0..dimensions {
            let label = format!("d{}", dimension);
            out.write_i32::<LittleEndian>(label.len() as i32).unwrap();
            out.write_all(label.as_bytes()).unwrap();
        }
        if dimensions > 0 {
            for step in 0..self.sizes[0] {
                out.write_f64::<LittleEndian>(step as f64 * 0.5).unwrap();
            }
        }
        out
    }
}

/// Assembles a file of the given version from stacks laid out back to back
pub fn build_obf(version: i32, description: &str, stacks: &[StackFixture]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_all(b"OMAS_BF\n").unwrap();
    out.write_i16::<LittleEndian>(-1).unwrap();
    out.write_i32::<LittleEndian>(version).unwrap();
    let first = 26 + description.len() as i64;
    out.write_i64::<LittleEndian>(if stacks.is_empty() { 0 } else { first }).unwrap();
    out.write_i32::<LittleEndian>(description.len() as i32).unwrap();
    out.write_all(description.as_bytes()).unwrap();

    let mut position = first as u64;
    for (index, stack) in stacks.iter().enumerate() {
        let following = position + stack.record_len(version);
        let next = stack
            .next
            .unwrap_or(if index + 1 < stacks.len() { following as i64 } else { 0 });

        out.write_all(b"OMAS_BF_STACK\n").unwrap();
        out.write_i16::<LittleEndian>(-1).unwrap();
        out.write_i32::<LittleEndian>(3).unwrap();
        out.write_i32::<LittleEndian>(stack.dimensions).unwrap();
        for slot in 0..15 {
            out.write_i32::<LittleEndian>(stack.sizes.get(slot).copied().unwrap_or(0)).unwrap();
        }
        for slot in 0..15 {
            out.write_f64::<LittleEndian>(slot as f64 + 1.0).unwrap();
        }
        for _ in 0..15 {
            out.write_f64::<LittleEndian>(0.0).unwrap();
        }
        out.write_i32::<LittleEndian>(stack.type_code).unwrap();
        out.write_i32::<LittleEndian>(stack.compression).unwrap();
        out.write_all(&[0u8; 4]).unwrap();
        out.write_i32::<LittleEndian>(stack.name.len() as i32).unwrap();
        out.write_i32::<LittleEndian>(0).unwrap();
        out.write_all(&[0u8; 8]).unwrap();
        out.write_i64::<LittleEndian>(stack.declared_length.unwrap_or(stack.data.len() as i64)).unwrap();
        out.write_i64::<LittleEndian>(next).unwrap();
        out.write_all(stack.name.as_bytes()).unwrap();
        out.write_all(&stack.data).unwrap();
        if version >= 1 {
            out.write_all(&stack.footer()).unwrap();
        }
        position = following;
    }
    out
}

/// `build_obf` wrapped in a cursor
pub fn obf_cursor(version: i32, stacks: &[StackFixture]) -> Cursor<Vec<u8>> {
    Cursor::new(build_obf(version, "test file", stacks))
}

/// Bytes where plane `p` is filled with `p + 1`
pub fn planes_filled(plane_bytes: usize, planes: usize) -> Vec<u8> {
    (0..planes).flat_map(|p| std::iter::repeat((p + 1) as u8).take(plane_bytes)).collect()
}
