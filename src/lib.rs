pub mod io;
pub mod utils;
pub mod metadata;
pub mod format;
pub mod compression;
pub mod ics;
pub mod obf;
pub mod commands;
pub mod api;

pub use crate::api::PlaneKit;

pub use format::{FormatError, FormatResult, FormatRegistry, Region, PlaneReader, PlaneWriter, WriterOptions};
pub use metadata::{Axis, ImageMetadata, Metadata, MetaTable, MetaValue, PixelKind};
pub use ics::IcsFormat;
pub use obf::ObfFormat;
