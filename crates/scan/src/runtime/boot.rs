//! Boot: logging init, config load, input resolution, parser and analyzer
//! construction.

use std::path::PathBuf;

use ingest::{Analyzer, LineParser};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::conf::ScanConfig;
use crate::error::ConfigError;
use crate::registry::{Registry, Sink};
use crate::resource;

/// Initialise the tracing / logging subsystem. Logs go to stderr; stdout
/// belongs to the analyzer.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scan=info,ingest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Everything a run needs, resolved before any input is read.
pub struct Session {
    pub config: ScanConfig,
    pub input: PathBuf,
    pub parser: Box<dyn LineParser>,
    pub analyzer: Box<dyn Analyzer>,
}

/// Load config, resolve the input file and build the parser and analyzer
/// named on the command line.
pub fn boot(cli: &Cli, registry: &Registry, sink: Sink) -> Result<Session, ConfigError> {
    let config = ScanConfig::load(cli.config.as_deref(), &cli.settings)?;
    let input = resource::resolve(&cli.file)?;
    let parser = registry.parser(&cli.parser, &config)?;
    let analyzer = registry.analyzer(&cli.analyzer, &config, sink)?;
    info!(
        parser = parser.name(),
        analyzer = cli.analyzer.as_str(),
        input = %input.display(),
        "session ready"
    );
    Ok(Session {
        config,
        input,
        parser,
        analyzer,
    })
}
