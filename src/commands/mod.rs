//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod describe_command;
pub mod plane_command;
pub mod convert_command;

pub use command_traits::{Command, CommandFactory};
pub use describe_command::DescribeCommand;
pub use plane_command::PlaneCommand;
pub use convert_command::ConvertCommand;

use clap::ArgMatches;
use crate::api::PlaneKit;
use crate::format::errors::FormatResult;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
#[derive(Default)]
pub struct PlanekitCommandFactory;

impl PlanekitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        PlanekitCommandFactory
    }
}

impl<'a> CommandFactory<'a> for PlanekitCommandFactory {
    fn create_command(&self, args: &ArgMatches, kit: &'a PlaneKit) -> FormatResult<Box<dyn Command + 'a>> {
        if args.get_one::<String>("convert").is_some() {
            Ok(Box::new(ConvertCommand::new(args, kit)?))
        } else if args.get_one::<String>("plane").is_some() {
            Ok(Box::new(PlaneCommand::new(args, kit)?))
        } else {
            // Default to describe command
            Ok(Box::new(DescribeCommand::new(args, kit)?))
        }
    }
}
