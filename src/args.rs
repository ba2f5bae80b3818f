use clap::Parser;

/// This is an operator program for re-keying election tally sheets.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the session: server, polling station, entry number
    /// and default values. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (URL) The root of the validation service, for example http://localhost:8080. Setting this option
    /// overrides the value that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub server: Option<String>,

    /// (number) The polling station whose tally sheet is entered.
    #[clap(long, value_parser)]
    pub station: Option<u32>,

    /// (number, default 1) The entry number: 1 for the first entry, 2 for the second one.
    #[clap(long, value_parser)]
    pub entry: Option<u32>,

    /// (number, default 9) Digits beyond this limit are dropped while typing.
    #[clap(long, value_parser)]
    pub max_digits: Option<usize>,

    /// (file path or empty) If specified, the commands are read from this file instead of the standard input.
    #[clap(long, value_parser)]
    pub script: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
