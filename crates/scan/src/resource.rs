//! Resource: resolve the `--file` argument to a readable path.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Path list (platform syntax) searched when `--file` is not a path.
pub const RESOURCE_PATH_ENV: &str = "LOGSCAN_RESOURCE_PATH";

/// Resolve `name` against the filesystem, then against
/// `LOGSCAN_RESOURCE_PATH`.
pub fn resolve(name: &str) -> Result<PathBuf, ConfigError> {
    resolve_in(name, env::var_os(RESOURCE_PATH_ENV).as_deref())
}

pub fn resolve_in(name: &str, search_path: Option<&OsStr>) -> Result<PathBuf, ConfigError> {
    let direct = Path::new(name);
    if direct.is_file() {
        return Ok(direct.to_path_buf());
    }
    if direct.is_relative() {
        if let Some(search_path) = search_path {
            for dir in env::split_paths(search_path) {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    tracing::debug!(path = %candidate.display(), "resolved input from resource path");
                    return Ok(candidate);
                }
            }
        }
    }
    Err(ConfigError::InputNotFound(name.to_string()))
}
