//! Load: config loading from file, environment variables and `--set` pairs.

use std::fs;
use std::path::{Path, PathBuf};

use ingest::BlankLines;

use super::model::ScanConfig;
use super::serde_utils::split_list;
use crate::error::ConfigError;

/// Environment variable naming a TOML config file.
pub const CONFIG_FILE_ENV: &str = "LOGSCAN_CONFIG_FILE";

/// Property keys understood as environment variables and `--set` keys.
pub const PROPERTY_KEYS: [&str; 7] = [
    "logFormat",
    "blankLines",
    "ispn.classes",
    "ispn.methods",
    "writeToFile",
    "outputDir",
    "lockId",
];

impl ScanConfig {
    /// Load configuration from the process environment.
    /// Priority: `--set` pairs > Environment Variables > Config File > Defaults
    pub fn load(config_file: Option<&Path>, overrides: &[(String, String)]) -> Result<Self, ConfigError> {
        Self::load_with(config_file, overrides, |key| std::env::var(key).ok())
    }

    /// Same as `load`, reading variables through `env`.
    pub fn load_with<F>(config_file: Option<&Path>, overrides: &[(String, String)], env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_file {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                Self::from_file(path)?
            }
            None => match env(CONFIG_FILE_ENV) {
                Some(path) if Path::new(&path).exists() => {
                    tracing::info!("Loading configuration from: {}", path);
                    Self::from_file(Path::new(&path))?
                }
                Some(path) => {
                    tracing::info!("Config file not found at {}, using defaults", path);
                    Self::default()
                }
                None => Self::default(),
            },
        };

        for key in PROPERTY_KEYS {
            if let Some(value) = env(key) {
                config.set(key, &value)?;
            }
        }
        for (key, value) in overrides {
            if !config.set(key, value)? {
                tracing::warn!(key = key.as_str(), "ignoring unknown setting");
            }
        }

        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply one property. Returns `false` when `key` is not a known
    /// property.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "logFormat" => self.log_format = Some(value.to_string()),
            "blankLines" => {
                let policy = value.parse::<BlankLines>().map_err(|reason| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason,
                })?;
                self.blank_lines = Some(policy);
            }
            "ispn.classes" => self.test_suite.classes = split_list(value),
            "ispn.methods" => self.test_suite.methods = split_list(value),
            "writeToFile" => self.test_suite.write_to_file = value.trim().eq_ignore_ascii_case("true"),
            "outputDir" => self.test_suite.output_dir = PathBuf::from(value),
            "lockId" => self.lock.lock_ids = split_list(value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.test_suite.validate()
    }
}

/// Parse a `KEY=VALUE` command-line pair. The value may contain `=`.
pub fn parse_setting(pair: &str) -> Result<(String, String), ConfigError> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(ConfigError::MalformedSetting(pair.to_string())),
    }
}
