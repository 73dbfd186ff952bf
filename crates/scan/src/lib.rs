// logscan: command-line front end over the ingest pipeline, with the
// configuration layer, the parser/analyzer registry and the analyzers.

pub mod analyzers;
pub mod cli;
pub mod conf;
pub mod error;
pub mod registry;
pub mod resource;
pub mod runtime;

pub use cli::Cli;
pub use conf::ScanConfig;
pub use error::{ConfigError, RunError};
pub use registry::Registry;
