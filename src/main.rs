mod args;
mod session;

use clap::Parser;
use log::{debug, info, warn};
use snafu::ErrorCompat;
use tally_entry::fields::FormSection;
use std::io;

use crate::args::Args;
use crate::session::config_reader::{read_config, resolve_settings, SessionConfig};
use crate::session::http_service::HttpValidationService;
use crate::session::*;

fn run(args: &Args) -> EntryResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => SessionConfig::default(),
    };
    let settings = resolve_settings(&config, args)?;
    info!(
        "Entering polling station {} entry {} against {}",
        settings.target.polling_station_id, settings.target.entry_number, settings.server_url
    );
    debug!("run: settings {:?}", settings);

    let mut service = HttpValidationService::new(&settings.server_url, settings.timeout);
    let input = open_input(args.script.as_deref())?;
    let stdout = io::stdout();
    let mut output = stdout.lock();

    let report = run_session(&settings, input, &mut output, &mut service)?;
    if !report.completed {
        warn!(
            "The entry is not complete: {} of {} sections accepted",
            report.accepted_sections.len(),
            FormSection::ALL.len()
        );
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("args: {:?}", args);

    if let Err(e) = run(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
