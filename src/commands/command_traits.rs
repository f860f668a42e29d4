//! Command pattern interfaces
//!
//! This module defines the core Command pattern interfaces
//! for the CLI application, enabling a clean separation of concerns.

use std::path::PathBuf;

use clap::ArgMatches;

use crate::api::PlaneKit;
use crate::format::errors::{FormatError, FormatResult};

/// Represents an executable command in the application
///
/// Command objects encapsulate the logic for a specific CLI operation,
/// allowing for separation of concerns and better testability.
pub trait Command {
    /// Execute the command
    ///
    /// # Returns
    /// Result indicating success or an error
    fn execute(&self) -> FormatResult<()>;
}

/// Factory for creating commands from CLI arguments
///
/// This trait defines the interface for command factories
/// which can parse CLI arguments and create the appropriate Command.
pub trait CommandFactory<'a> {
    /// Create a new Command instance based on CLI arguments
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `kit` - Library facade the command runs against
    ///
    /// # Returns
    /// A command that implements the Command trait, or an error
    fn create_command(&self, args: &ArgMatches, kit: &'a PlaneKit) -> FormatResult<Box<dyn Command + 'a>>;
}

/// Reads the positional input path shared by every command
pub(crate) fn input_path(args: &ArgMatches) -> FormatResult<PathBuf> {
    args.get_one::<String>("input")
        .map(PathBuf::from)
        .ok_or_else(|| FormatError::GenericError("Missing input file".to_string()))
}

/// Reads an optional non-negative index argument
pub(crate) fn index_arg(args: &ArgMatches, name: &str) -> FormatResult<Option<usize>> {
    match args.get_one::<String>(name) {
        Some(value) => value.parse::<usize>().map(Some).map_err(|_| {
            FormatError::GenericError(format!("Invalid --{} value: {}", name, value))
        }),
        None => Ok(None),
    }
}
