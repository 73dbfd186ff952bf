use std::path::PathBuf;

use ingest::DriveError;
use thiserror::Error;

/// Everything that can go wrong before the first line is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown parser '{name}' (available: {known})")]
    UnknownParser { name: String, known: String },

    #[error("Unknown analyzer '{name}' (available: {known})")]
    UnknownAnalyzer { name: String, known: String },

    #[error("{0} not found!")]
    InputNotFound(String),

    #[error("Cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid setting '{0}': expected KEY=VALUE")]
    MalformedSetting(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failure of a whole `logscan` invocation.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Drive(#[from] DriveError),
}

impl RunError {
    /// Process exit code: 2 for configuration problems, 1 for faults while
    /// the stream was being analyzed.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) => 2,
            RunError::Drive(_) => 1,
        }
    }
}
