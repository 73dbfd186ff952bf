//! Conf module: configuration model, loading, and custom deserializers.

pub mod model;
pub mod load;
pub mod serde_utils;

pub use load::{parse_setting, CONFIG_FILE_ENV, PROPERTY_KEYS};
pub use model::{LockConfig, ScanConfig, TestSuiteConfig};
