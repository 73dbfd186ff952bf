use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header layout understood by the ISPN parser, selected by the
/// `logFormat` setting (`1`, `2` or `3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogFormat {
    /// `YYYY-MM-DD HH:MM:SS,mmm LEVEL (thread) [class] message`
    Dated,
    /// `YYYY-MM-DD HH:MM:SS,mmm <epoch-ms> LEVEL [class] (thread) message`
    Epoch,
    /// `HH:MM:SS,mmm LEVEL (thread) [class] message`
    TimeOnly,
}

impl LogFormat {
    /// Numeric selector as written in configuration.
    pub fn selector(&self) -> u8 {
        match self {
            LogFormat::Dated => 1,
            LogFormat::Epoch => 2,
            LogFormat::TimeOnly => 3,
        }
    }

    /// Resolve the configured selector and print the fallback notice, if
    /// any, on stdout.
    pub fn from_setting(value: Option<&str>) -> Self {
        let (format, notice) = Self::resolve(value);
        if let Some(notice) = notice {
            println!("{notice}");
        }
        format
    }

    /// Resolve the configured selector without printing.
    ///
    /// Anything missing, unparseable or out of range falls back to `Dated`
    /// together with the notice the user should see.
    pub fn resolve(value: Option<&str>) -> (Self, Option<String>) {
        let Some(raw) = value else {
            return (LogFormat::Dated, Some("Format not specified. Using format 1".to_string()));
        };
        match raw.trim().parse::<u8>() {
            Ok(1) => (LogFormat::Dated, None),
            Ok(2) => (LogFormat::Epoch, None),
            Ok(3) => (LogFormat::TimeOnly, None),
            _ => {
                tracing::debug!(value = raw, "unrecognized log format selector");
                (LogFormat::Dated, Some(format!("Unknown format {raw}. Using format 1")))
            }
        }
    }
}

/// How the record iterator treats an empty physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlankLines {
    /// Fold into the current record, or drop before the first header.
    #[default]
    Continue,
    /// End of stream: emit the current record and stop reading.
    Terminate,
}

impl std::str::FromStr for BlankLines {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(BlankLines::Continue),
            "terminate" => Ok(BlankLines::Terminate),
            other => Err(format!("unknown blank line policy '{other}' (expected continue or terminate)")),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Reached end of line while reading {field}. State={cursor}")]
    EndOfLine { field: &'static str, cursor: String },

    #[error("Expected a {expected} to open {field} but found {found}. State={cursor}")]
    UnexpectedChar {
        field: &'static str,
        expected: char,
        found: char,
        cursor: String,
    },

    #[error("Unterminated {field} field. State={cursor}")]
    Unterminated { field: &'static str, cursor: String },

    #[error("Empty {field} field. State={cursor}")]
    EmptyField { field: &'static str, cursor: String },

    #[error("Invalid epoch timestamp '{value}'. State={cursor}")]
    InvalidEpoch { value: String, cursor: String },
}
