//! I/O utilities for stream handling
//!
//! This module provides the seekable stream traits the formats read from and
//! write to, plus byte order strategies for fixed-width values.

pub mod seekable;
pub mod byte_order;
pub mod stream;

pub use seekable::{SeekableReader, SeekableWriter};
pub use byte_order::{ByteOrder, ByteOrderHandler};
pub use stream::StreamExt;
