//! Concrete analyzers. Each one writes its report to the sink it was built
//! with and reports anomalies through `tracing`.

pub mod avg_interval;
pub mod json;
pub mod lock;
pub mod test_suite;
pub mod tx_read_only;
pub mod tx_stats;
pub mod tx_time;

pub use avg_interval::AvgEventIntervalAnalyzer;
pub use json::JsonAnalyzer;
pub use lock::LockAnalyzer;
pub use test_suite::TestSuiteAnalyzer;
pub use tx_read_only::TxReadOnlyAnalyzer;
pub use tx_stats::TxStatsAnalyzer;
pub use tx_time::TxTimeAnalyzer;
