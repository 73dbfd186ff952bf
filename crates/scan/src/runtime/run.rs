//! Run: one `logscan` invocation from argv to exit code.

use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

use clap::Parser;
use ingest::driver::display_chain;
use ingest::{DriveSummary, Driver, LineSource};

use super::boot;
use crate::cli::Cli;
use crate::error::{ConfigError, RunError};
use crate::registry::{Registry, Sink};

/// Parse `args`, run the analysis with stdout as the report sink and map
/// the outcome to an exit code.
pub fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            // clap writes usage to stderr (or help to stdout) itself.
            let _ = err.print();
            return ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(2));
        }
    };

    match execute(&cli, &Registry::builtin(), Box::new(io::stdout())) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            if let RunError::Config(config) = &err {
                eprintln!("Error: {}", display_chain(config));
            }
            ExitCode::from(err.exit_code())
        }
    }
}

/// Build the session for `cli` and drive its input through the analyzer.
pub fn execute(cli: &Cli, registry: &Registry, sink: Sink) -> Result<DriveSummary, RunError> {
    let boot::Session {
        config,
        input,
        parser,
        mut analyzer,
    } = boot::boot(cli, registry, sink)?;

    let source = LineSource::open(&input).map_err(|err| ConfigError::Io {
        path: input.clone(),
        source: err,
    })?;

    let summary = Driver::new(parser.as_ref())
        .with_blank_lines(config.blank_lines)
        .run_source(analyzer.as_mut(), source)?;
    Ok(summary)
}
