use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::parser::LogFormat;
use crate::time;

/// One logical log entry, possibly spanning several physical lines.
///
/// Equality and hashing ignore `line_number`: two records with the same
/// header fields and message are the same event, wherever they sit.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    line_number: u64,
    timestamp_ms: i64,
    level: String,
    class_name: String,
    thread: String,
    message: String,
}

impl Record {
    pub fn new(
        line_number: u64,
        timestamp_ms: i64,
        level: impl Into<String>,
        class_name: impl Into<String>,
        thread: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line_number,
            timestamp_ms,
            level: level.into(),
            class_name: class_name.into(),
            thread: thread.into(),
            message: message.into(),
        }
    }

    /// 1-based number of the header line.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Milliseconds since the epoch, or [`time::UNKNOWN`].
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn thread(&self) -> &str {
        &self.thread
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The message up to its first embedded newline.
    pub fn first_line(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Render the record back into a header layout. Continuation lines stay
    /// embedded in the message.
    pub fn render(&self, format: LogFormat) -> String {
        let date = time::render_date(self.timestamp_ms).unwrap_or_else(|| "N/A".to_string());
        let clock = time::render_time(self.timestamp_ms).unwrap_or_else(|| "N/A".to_string());
        match format {
            LogFormat::Dated => format!(
                "{date} {clock} {} ({}) [{}] {}",
                self.level, self.thread, self.class_name, self.message
            ),
            LogFormat::Epoch => format!(
                "{date} {clock} {} {} [{}] ({}) {}",
                self.timestamp_ms, self.level, self.class_name, self.thread, self.message
            ),
            LogFormat::TimeOnly => format!(
                "{clock} {} ({}) [{}] {}",
                self.level, self.thread, self.class_name, self.message
            ),
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp_ms == other.timestamp_ms
            && self.level == other.level
            && self.class_name == other.class_name
            && self.thread == other.thread
            && self.message == other.message
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.timestamp_ms.hash(state);
        self.level.hash(state);
        self.class_name.hash(state);
        self.thread.hash(state);
        self.message.hash(state);
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(LogFormat::Dated))
    }
}

/// A record still being assembled by the iterator.
///
/// Continuation lines can only be appended here; `build` freezes the result.
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    pub fn line_number(&self) -> u64 {
        self.record.line_number
    }

    pub fn append_continuation(&mut self, line: &str) {
        self.record.message.push('\n');
        self.record.message.push_str(line);
    }

    pub fn build(self) -> Record {
        self.record
    }
}

impl From<Record> for RecordBuilder {
    fn from(record: Record) -> Self {
        Self { record }
    }
}
