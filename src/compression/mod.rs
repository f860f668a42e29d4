//! Compression handling for pixel payloads
//!
//! Whole-buffer strategies behind [`CompressionHandler`], plus the streaming
//! pieces the formats need: a resumable zlib inflater over a bounded file
//! region and a plane-ordered encoder for sequential writers.

mod handler;
mod uncompressed;
mod deflate;
mod gzip;
mod factory;
pub mod inflater;
pub mod stream_encoder;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::ZlibHandler;
pub use gzip::GzipHandler;
pub use factory::CompressionFactory;
pub use inflater::StreamInflater;
pub use stream_encoder::{PlaneStreamEncoder, StreamKind};
