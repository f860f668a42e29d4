//! Seekable reader and writer traits
//!
//! This module provides unified traits for streams that support both
//! transferring bytes and seeking. Files and in-memory cursors both qualify.

use std::io::{Read, Seek, Write};

/// Trait for readers that can both read and seek
///
/// Every format reads through this trait, so a local file, an in-memory
/// buffer or any other random-access byte source can be plugged in.
pub trait SeekableReader: Read + Seek + Send + Sync {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek + Send + Sync> SeekableReader for T {}

/// Trait for writers that can both write and seek
///
/// Writers need random access because uncompressed regions are written in place.
pub trait SeekableWriter: Write + Seek + Send + Sync {}

impl<T: Write + Seek + Send + Sync> SeekableWriter for T {}
