//! Format conversion command
//!
//! This module implements the command for copying every plane of a
//! dataset into a file of the format named by the output suffix.

use std::path::PathBuf;

use clap::ArgMatches;
use log::info;

use crate::api::PlaneKit;
use crate::commands::command_traits::{input_path, Command};
use crate::format::errors::{FormatError, FormatResult};
use crate::format::writer::WriterOptions;

/// Command for converting between formats
pub struct ConvertCommand<'a> {
    /// Path to the input file
    input_file: PathBuf,
    /// Path to the output file
    output_file: PathBuf,
    /// Compression and ordering for the writer
    options: WriterOptions,
    kit: &'a PlaneKit,
}

impl<'a> ConvertCommand<'a> {
    /// Create a new convert command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `kit` - Library facade
    ///
    /// # Returns
    /// A new ConvertCommand instance or an error
    pub fn new(args: &ArgMatches, kit: &'a PlaneKit) -> FormatResult<Self> {
        let output_file = args.get_one::<String>("convert")
            .map(PathBuf::from)
            .ok_or_else(|| FormatError::GenericError("Missing output file path for conversion".to_string()))?;

        let options = match args.get_one::<String>("compression") {
            Some(name) => WriterOptions::with_compression(name),
            None => WriterOptions::default(),
        };

        Ok(ConvertCommand {
            input_file: input_path(args)?,
            output_file,
            options,
            kit,
        })
    }
}

impl<'a> Command for ConvertCommand<'a> {
    fn execute(&self) -> FormatResult<()> {
        info!("Converting file {} to {}", self.input_file.display(), self.output_file.display());

        let written = self.kit.convert(&self.input_file, &self.output_file, &self.options)?;

        info!("Conversion successful: {} image(s) written as {}", written.image_count(), written.format_name);
        Ok(())
    }
}
