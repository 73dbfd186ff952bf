//! Driver: pumps one stream through one analyzer and honors the analyzer
//! lifecycle.

use std::any::Any;
use std::io::BufRead;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::analyzer::Analyzer;
use crate::parser::{BlankLines, LineParser};
use crate::source::LineSource;
use crate::stream::{RecordIterator, StreamError, StreamStats};

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Analyzer failed to prepare")]
    Prepare(#[source] anyhow::Error),

    #[error("Analyzer failed on record at line {line_number}")]
    Consume {
        line_number: u64,
        #[source]
        source: anyhow::Error,
    },

    #[error("Analyzer panicked during {phase}: {message}")]
    Panicked { phase: &'static str, message: String },

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("Analyzer failed to finalize")]
    Finalize(#[source] anyhow::Error),
}

/// Outcome of a stream that drained without faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DriveSummary {
    pub records_consumed: u64,
    pub stream: StreamStats,
}

pub struct Driver<'p> {
    parser: &'p dyn LineParser,
    blank_lines: Option<BlankLines>,
}

impl<'p> Driver<'p> {
    pub fn new(parser: &'p dyn LineParser) -> Self {
        Self {
            parser,
            blank_lines: None,
        }
    }

    /// Override the parser's blank-line policy; `None` keeps it.
    pub fn with_blank_lines(mut self, blank_lines: Option<BlankLines>) -> Self {
        self.blank_lines = blank_lines;
        self
    }

    pub fn records<R: BufRead>(&self, reader: R) -> RecordIterator<'p, R> {
        self.records_from(LineSource::new(reader))
    }

    fn records_from<R: BufRead>(&self, source: LineSource<R>) -> RecordIterator<'p, R> {
        let records = RecordIterator::new(self.parser, source);
        match self.blank_lines {
            Some(policy) => records.with_blank_lines(policy),
            None => records,
        }
    }

    /// Run `analyzer` over every record of `reader`.
    pub fn run<R: BufRead>(&self, analyzer: &mut dyn Analyzer, reader: R) -> Result<DriveSummary, DriveError> {
        self.run_source(analyzer, LineSource::new(reader))
    }

    /// Run `analyzer` over every record of an already opened line source.
    ///
    /// `finalize` runs exactly once whatever happens in `prepare`, `consume`
    /// or the stream. The first fault wins; a failing `finalize` after an
    /// earlier fault is only logged.
    pub fn run_source<R: BufRead>(
        &self,
        analyzer: &mut dyn Analyzer,
        source: LineSource<R>,
    ) -> Result<DriveSummary, DriveError> {
        let mut records = self.records_from(source);
        let pumped = pump(&mut records, analyzer);
        let finalized = guard("finalize", || analyzer.finalize().map_err(DriveError::Finalize));

        let outcome = match (pumped, finalized) {
            (Ok(records_consumed), Ok(())) => Ok(DriveSummary {
                records_consumed,
                stream: records.stats(),
            }),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(late)) => {
                error!(error = %display_chain(&late), "finalize failed after an earlier fault");
                Err(err)
            }
            (Ok(_), Err(err)) => Err(err),
        };

        match &outcome {
            Ok(summary) => info!(
                parser = self.parser.name(),
                records = summary.records_consumed,
                lines = summary.stream.lines_read,
                continuations = summary.stream.continuation_lines,
                dropped = summary.stream.dropped_lines,
                "stream drained"
            ),
            Err(err) => error!(parser = self.parser.name(), error = %display_chain(err), "analysis aborted"),
        }
        outcome
    }
}

fn pump<R: BufRead>(records: &mut RecordIterator<'_, R>, analyzer: &mut dyn Analyzer) -> Result<u64, DriveError> {
    guard("prepare", || analyzer.prepare().map_err(DriveError::Prepare))?;

    let mut consumed = 0u64;
    while records.has_next()? {
        let Some(record) = records.next_record()? else {
            break;
        };
        let line_number = record.line_number();
        guard("consume", || {
            analyzer
                .consume(record)
                .map_err(|source| DriveError::Consume { line_number, source })
        })?;
        consumed += 1;
    }
    Ok(consumed)
}

/// Run one analyzer phase, turning a panic into `DriveError::Panicked` so
/// the lifecycle can still complete.
fn guard<F>(phase: &'static str, f: F) -> Result<(), DriveError>
where
    F: FnOnce() -> Result<(), DriveError>,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(DriveError::Panicked {
            phase,
            message: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// `outer: inner: innermost` for an error and its sources.
pub fn display_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
