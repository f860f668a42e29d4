//! Dataset description command
//!
//! Identifies the format of a file and prints the structure of every image
//! it holds, followed by the parsed annotations.

use std::path::PathBuf;

use clap::ArgMatches;
use log::{debug, info};

use crate::api::{describe_metadata, PlaneKit};
use crate::commands::command_traits::{input_path, index_arg, Command};
use crate::format::errors::FormatResult;

/// Command for describing a dataset
pub struct DescribeCommand<'a> {
    /// Path to the input file
    input_file: PathBuf,
    /// Restricts the output to one image
    image: Option<usize>,
    /// Whether to enable verbose output
    verbose: bool,
    kit: &'a PlaneKit,
}

impl<'a> DescribeCommand<'a> {
    /// Create a new describe command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `kit` - Library facade
    ///
    /// # Returns
    /// A new DescribeCommand instance or an error
    pub fn new(args: &ArgMatches, kit: &'a PlaneKit) -> FormatResult<Self> {
        Ok(DescribeCommand {
            input_file: input_path(args)?,
            image: index_arg(args, "image")?,
            verbose: args.get_flag("verbose"),
            kit,
        })
    }
}

impl<'a> Command for DescribeCommand<'a> {
    fn execute(&self) -> FormatResult<()> {
        info!("Describing file: {}", self.input_file.display());

        if self.verbose {
            debug!("Verbose mode enabled");
        }

        let format = self.kit.identify(&self.input_file)?;
        info!("Format: {}", format);

        let mut reader = self.kit.open(&self.input_file)?;
        let text = match self.image {
            Some(index) => {
                let image = reader.metadata()?.image(index)?;
                let mut text = format!("Image #{}\n{}", index, image);
                if !image.table.is_empty() {
                    text.push_str("Annotations:\n");
                    text.push_str(&image.table.to_string());
                }
                text
            }
            None => describe_metadata(reader.metadata()?),
        };
        reader.close();

        for line in text.lines() {
            info!("{}", line);
        }

        debug!("Description completed successfully");
        Ok(())
    }
}
