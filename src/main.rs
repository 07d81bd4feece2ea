use keepspec::check::check_configuration;
use keepspec::*;

use clap::{value_parser, Arg, ArgAction, Command};
use std::fmt;
use std::path::PathBuf;

fn main() -> Result<(), Error> {
    env_logger::init();

    let matches = Command::new("keepspec")
        .version(clap::crate_version!())
        .about("Check the class specifications of a shrinker configuration")
        .arg(
            Arg::new("print configuration")
                .long("print-configuration")
                .action(ArgAction::SetTrue)
                .help("Print the configuration back out, normalized"),
        )
        .arg(
            Arg::new("CONFIG")
                .help("Configuration file with the rules to check")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .get_matches();

    let config_file = matches
        .get_one::<PathBuf>("CONFIG")
        .ok_or(Error::MissingArgument("CONFIG"))?;
    log::info!("Reading '{}'", config_file.display());
    let mut configuration = config::read_configuration(config_file)?;
    let removed = configuration.deduplicate_keep_rules();
    if removed > 0 {
        log::warn!("Ignoring {} duplicate keep rules", removed);
    }

    let problems = check_configuration(&configuration);
    for problem in &problems {
        log::error!("{}", problem);
    }
    log::info!(
        "Checked {} rules and {} class path entries, {} problems",
        configuration.keep.len()
            + configuration.assume_no_side_effects.len()
            + configuration.why_are_you_keeping.len(),
        configuration.program_jars.entries.len() + configuration.library_jars.entries.len(),
        problems.len()
    );

    if matches.get_flag("print configuration") {
        print!("{}", config::write_configuration(&configuration)?);
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Invalid(problems.len()))
    }
}

enum Error {
    MissingArgument(&'static str),
    Config(config::Error),
    Invalid(usize),
}

impl From<config::Error> for Error {
    fn from(err: config::Error) -> Error {
        Error::Config(err)
    }
}

/// `main` reports errors with `Debug`, so this is what the user sees
impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingArgument(argument) => write!(f, "missing argument {}", argument),
            Error::Config(err) => write!(f, "{}", err),
            Error::Invalid(count) => write!(f, "{} patterns failed to compile", count),
        }
    }
}
