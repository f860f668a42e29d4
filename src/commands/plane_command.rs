//! Plane export command
//!
//! Reads one whole plane and writes its raw sample bytes to a file.

use std::path::PathBuf;

use clap::ArgMatches;
use log::info;

use crate::api::PlaneKit;
use crate::commands::command_traits::{input_path, index_arg, Command};
use crate::format::errors::{FormatError, FormatResult};

/// Command for exporting a single plane
pub struct PlaneCommand<'a> {
    /// Path to the input file
    input_file: PathBuf,
    /// Image within the dataset
    image: usize,
    /// Plane within the image
    plane: usize,
    /// Destination of the raw bytes, when given
    output_file: Option<PathBuf>,
    kit: &'a PlaneKit,
}

impl<'a> PlaneCommand<'a> {
    /// Create a new plane command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `kit` - Library facade
    ///
    /// # Returns
    /// A new PlaneCommand instance or an error
    pub fn new(args: &ArgMatches, kit: &'a PlaneKit) -> FormatResult<Self> {
        let plane = index_arg(args, "plane")?
            .ok_or_else(|| FormatError::GenericError("Missing plane index".to_string()))?;

        Ok(PlaneCommand {
            input_file: input_path(args)?,
            image: index_arg(args, "image")?.unwrap_or(0),
            plane,
            output_file: args.get_one::<String>("output").map(PathBuf::from),
            kit,
        })
    }
}

impl<'a> Command for PlaneCommand<'a> {
    fn execute(&self) -> FormatResult<()> {
        match &self.output_file {
            Some(output) => {
                self.kit.export_plane(&self.input_file, self.image, self.plane, output)?;
            }
            None => {
                let plane = self.kit.read_plane(&self.input_file, self.image, self.plane)?;
                let nonzero = plane.iter().filter(|b| **b != 0).count();
                info!(
                    "Plane {} of image {}: {} bytes, {} non-zero",
                    self.plane,
                    self.image,
                    plane.len(),
                    nonzero
                );
            }
        }
        Ok(())
    }
}
