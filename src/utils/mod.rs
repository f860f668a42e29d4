//! Utility modules for common functionality
//!
//! Logging, header text and date helpers shared by the formats.

pub mod logger;
pub mod date_utils;
pub(crate) mod string_utils;
