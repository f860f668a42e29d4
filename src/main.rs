use clap::{Arg, Command as ClapCommand, ArgAction};
use std::process;
use log::{error, Level};

use planekit::PlaneKit;
use planekit::utils::logger::Logger;
use planekit::commands::{CommandFactory, PlanekitCommandFactory};

fn main() {
    let matches = ClapCommand::new("PlaneKit")
        .version("0.1")
        .author("Maurice Schilpp")
        .about("Describe, read and convert ICS and OBF microscopy files")
        .arg(
            Arg::new("input")
                .help("Input ICS or OBF file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("image")
                .short('i')
                .long("image")
                .help("Image index within the dataset")
                .value_name("N")
                .required(false),
        )
        .arg(
            Arg::new("plane")
                .short('p')
                .long("plane")
                .help("Read one plane of the selected image")
                .value_name("N")
                .required(false),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("File receiving the raw bytes of the plane")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("convert")
                .short('c')
                .long("convert")
                .help("Convert to the format named by the file suffix (.ics, .obf)")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("compression")
                .long("compression")
                .help("Compression of the converted file (uncompressed, gzip for ICS, zlib for OBF)")
                .value_name("NAME")
                .required(false),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write log output to this file as well as the console")
                .value_name("FILE")
                .required(false),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") { Level::Debug } else { Level::Info };

    match matches.get_one::<String>("log-file") {
        Some(log_file) => {
            if let Err(e) = Logger::init_global_logger(log_file, level) {
                eprintln!("Error setting up global logger: {}", e);
                process::exit(1);
            }
        }
        None => {
            env_logger::Builder::new()
                .filter_level(level.to_level_filter())
                .parse_default_env()
                .init();
        }
    }

    let kit = PlaneKit::new();
    let factory = PlanekitCommandFactory::new();

    let command_result = factory.create_command(&matches, &kit);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
