//! Registry: maps `--parser` and `--analyzer` identifiers to factories.

use std::collections::BTreeMap;
use std::io::Write;

use ingest::parser::{IspnParser, TorqueBoxParser};
use ingest::{Analyzer, LineParser, LogFormat};

use crate::analyzers::{
    AvgEventIntervalAnalyzer, JsonAnalyzer, LockAnalyzer, TestSuiteAnalyzer, TxReadOnlyAnalyzer, TxStatsAnalyzer,
    TxTimeAnalyzer,
};
use crate::conf::ScanConfig;
use crate::error::ConfigError;

/// Where an analyzer writes its report.
pub type Sink = Box<dyn Write>;

pub type ParserFactory = fn(&ScanConfig) -> Box<dyn LineParser>;
pub type AnalyzerFactory = fn(&ScanConfig, Sink) -> Box<dyn Analyzer>;

pub struct Registry {
    parsers: BTreeMap<&'static str, ParserFactory>,
    analyzers: BTreeMap<&'static str, AnalyzerFactory>,
}

impl Registry {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            parsers: BTreeMap::new(),
            analyzers: BTreeMap::new(),
        }
    }

    /// Every parser and analyzer shipped with `logscan`.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register_parser("ispn", |config| {
            Box::new(IspnParser::new(LogFormat::from_setting(config.log_format.as_deref())))
        });
        registry.register_parser("torquebox", |_| Box::new(TorqueBoxParser));

        registry.register_analyzer("tx-time", |_, sink| Box::new(TxTimeAnalyzer::new(sink)));
        registry.register_analyzer("tx-read-only", |_, sink| Box::new(TxReadOnlyAnalyzer::new(sink)));
        registry.register_analyzer("tx-stats", |_, sink| Box::new(TxStatsAnalyzer::new(sink)));
        registry.register_analyzer("avg-event-interval", |_, sink| {
            Box::new(AvgEventIntervalAnalyzer::new(sink))
        });
        registry.register_analyzer("lock", |config, sink| Box::new(LockAnalyzer::new(&config.lock, sink)));
        registry.register_analyzer("test-suite", |config, sink| {
            Box::new(TestSuiteAnalyzer::new(&config.test_suite, sink))
        });
        registry.register_analyzer("json", |_, sink| Box::new(JsonAnalyzer::new(sink)));
        registry
    }

    pub fn register_parser(&mut self, name: &'static str, factory: ParserFactory) {
        self.parsers.insert(name, factory);
    }

    pub fn register_analyzer(&mut self, name: &'static str, factory: AnalyzerFactory) {
        self.analyzers.insert(name, factory);
    }

    pub fn parser_names(&self) -> Vec<&'static str> {
        self.parsers.keys().copied().collect()
    }

    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.analyzers.keys().copied().collect()
    }

    pub fn parser(&self, name: &str, config: &ScanConfig) -> Result<Box<dyn LineParser>, ConfigError> {
        let factory = self.parsers.get(name).ok_or_else(|| ConfigError::UnknownParser {
            name: name.to_string(),
            known: self.parser_names().join(", "),
        })?;
        Ok(factory(config))
    }

    pub fn analyzer(&self, name: &str, config: &ScanConfig, sink: Sink) -> Result<Box<dyn Analyzer>, ConfigError> {
        let factory = self.analyzers.get(name).ok_or_else(|| ConfigError::UnknownAnalyzer {
            name: name.to_string(),
            known: self.analyzer_names().join(", "),
        })?;
        Ok(factory(config, sink))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
