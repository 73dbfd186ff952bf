use std::path::PathBuf;

use clap::Parser;

use crate::conf::parse_setting;

/// Run one analyzer over one log file.
#[derive(Debug, Parser)]
#[command(name = "logscan", version)]
pub struct Cli {
    /// Parser identifier (ispn, torquebox)
    #[arg(long)]
    pub parser: String,

    /// Analyzer identifier (tx-time, tx-read-only, tx-stats, avg-event-interval, lock, test-suite, json)
    #[arg(long)]
    pub analyzer: String,

    /// Relative or full path of the log file, also searched in LOGSCAN_RESOURCE_PATH
    #[arg(long)]
    pub file: String,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override a property, e.g. --set logFormat=3 (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_setting)]
    pub settings: Vec<(String, String)>,
}
