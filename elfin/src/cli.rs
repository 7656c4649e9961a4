//! Command line parsing and [`Config`] construction.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};

/// The configuration of an `elfin` session.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Config {
    /// The path of the ELF file to inspect.
    pub file: PathBuf,
    /// Whether a debugging log file should be written.
    pub log: bool,
}

/// Parses `elfin`'s arguments to construct a [`Config`].
pub fn parse_arguments() -> Config {
    let matches = command_parser().get_matches();

    let file = matches
        .get_one::<PathBuf>("file")
        .cloned()
        .unwrap_or_else(|| unreachable!("`file` is a required argument"));
    let log = matches.get_flag("log");

    Config { file, log }
}

/// Returns the command parser for `elfin`.
fn command_parser() -> Command {
    let file = Arg::new("file")
        .value_name("ELF")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("The ELF file to inspect");

    let log = Arg::new("log")
        .short('l')
        .long("log")
        .action(ArgAction::SetTrue)
        .help("Create a debugging log file");

    Command::new("elfin")
        .about("Interactive investigator for 64-bit ELF object files")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(file)
        .arg(log)
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::command_parser;

    #[test]
    fn file_argument_is_required() {
        assert!(command_parser().try_get_matches_from(["elfin"]).is_err());
    }

    #[test]
    fn log_flag_is_optional() {
        let matches = command_parser()
            .try_get_matches_from(["elfin", "-l", "a.out"])
            .unwrap();
        assert!(matches.get_flag("log"));
        assert_eq!(
            matches.get_one::<PathBuf>("file"),
            Some(&PathBuf::from("a.out"))
        );

        let matches = command_parser()
            .try_get_matches_from(["elfin", "a.out"])
            .unwrap();
        assert!(!matches.get_flag("log"));
    }
}
