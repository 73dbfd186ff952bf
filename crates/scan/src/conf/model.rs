//! Model: ScanConfig and the per-analyzer sections.

use std::path::PathBuf;

use ingest::BlankLines;
use serde::{Deserialize, Serialize};

use super::serde_utils::{deserialize_comma_list, deserialize_string_or_number};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Raw format selector; resolved by `LogFormat::from_setting`.
    #[serde(alias = "logFormat", deserialize_with = "deserialize_string_or_number")]
    pub log_format: Option<String>,
    /// Overrides the parser's own blank-line policy when set.
    #[serde(alias = "blankLines")]
    pub blank_lines: Option<BlankLines>,
    pub test_suite: TestSuiteConfig,
    pub lock: LockConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestSuiteConfig {
    /// Fully-qualified test classes; only the simple name is matched.
    #[serde(deserialize_with = "deserialize_comma_list")]
    pub classes: Vec<String>,
    #[serde(deserialize_with = "deserialize_comma_list")]
    pub methods: Vec<String>,
    #[serde(alias = "writeToFile")]
    pub write_to_file: bool,
    #[serde(alias = "outputDir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Empty means every lock.
    #[serde(alias = "lockId", deserialize_with = "deserialize_comma_list")]
    pub lock_ids: Vec<String>,
}

impl Default for TestSuiteConfig {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            methods: Vec::new(),
            write_to_file: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl TestSuiteConfig {
    /// Simple class names (text after the last `.`), in configured order.
    pub fn simple_class_names(&self) -> Vec<String> {
        self.classes
            .iter()
            .map(|class| match class.rfind('.') {
                Some(index) => class[index + 1..].to_string(),
                None => class.clone(),
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.output_dir.as_os_str().is_empty() {
            return Err("test_suite.output_dir must not be empty".to_string());
        }
        Ok(())
    }
}
