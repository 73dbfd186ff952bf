use std::io::BufRead;

use tracing::{debug, trace};

use super::error::StreamError;
use super::metrics::StreamStats;
use crate::parser::{BlankLines, LineParser};
use crate::record::{Record, RecordBuilder};
use crate::source::LineSource;

/// Lazily assembles records from a line source.
///
/// Each line is offered to the parser. A header starts a new record and
/// emits the previous one; any other line is appended to the record being
/// assembled, or dropped while no header has been seen yet. The iterator is
/// single-pass and stops for good after the first error.
pub struct RecordIterator<'p, R> {
    parser: &'p dyn LineParser,
    source: LineSource<R>,
    blank_lines: BlankLines,
    /// Record still collecting continuation lines.
    pending: Option<RecordBuilder>,
    /// Fully assembled record waiting for `next_record`.
    ready: Option<Record>,
    finished: bool,
    stats: StreamStats,
}

impl<'p, R: BufRead> RecordIterator<'p, R> {
    pub fn new(parser: &'p dyn LineParser, source: LineSource<R>) -> Self {
        Self {
            parser,
            blank_lines: parser.blank_lines(),
            source,
            pending: None,
            ready: None,
            finished: false,
            stats: StreamStats::default(),
        }
    }

    /// Override the parser's blank-line policy.
    pub fn with_blank_lines(mut self, blank_lines: BlankLines) -> Self {
        self.blank_lines = blank_lines;
        self
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn has_next(&mut self) -> Result<bool, StreamError> {
        self.fill()?;
        Ok(self.ready.is_some())
    }

    pub fn next_record(&mut self) -> Result<Option<Record>, StreamError> {
        self.fill()?;
        let record = self.ready.take();
        if record.is_some() {
            self.stats.records_emitted += 1;
        }
        Ok(record)
    }

    /// Read until a record is complete or the stream ends.
    fn fill(&mut self) -> Result<(), StreamError> {
        if self.ready.is_some() || self.finished {
            return Ok(());
        }
        match self.assemble() {
            Ok(()) => Ok(()),
            Err(err) => {
                self.finished = true;
                self.pending = None;
                Err(err)
            }
        }
    }

    fn assemble(&mut self) -> Result<(), StreamError> {
        while let Some(line) = self.source.next_line()? {
            let line_number = self.source.line_number();
            self.stats.lines_read += 1;

            if line.is_empty() && self.blank_lines == BlankLines::Terminate {
                debug!(line_number, "blank line ends the stream");
                break;
            }

            match self.parser.parse_line(line_number, &line) {
                Ok(Some(header)) => {
                    self.stats.header_lines += 1;
                    trace!(line_number, "record header");
                    if let Some(previous) = self.pending.replace(RecordBuilder::from(header)) {
                        self.ready = Some(previous.build());
                        return Ok(());
                    }
                }
                Ok(None) => match self.pending.as_mut() {
                    Some(pending) => {
                        self.stats.continuation_lines += 1;
                        pending.append_continuation(&line);
                    }
                    None => {
                        self.stats.dropped_lines += 1;
                        trace!(line_number, "dropping line before first header");
                    }
                },
                Err(source) => return Err(StreamError::Parse { line_number, source }),
            }
        }

        self.finished = true;
        self.ready = self.pending.take().map(RecordBuilder::build);
        debug!(
            parser = self.parser.name(),
            lines = self.stats.lines_read,
            headers = self.stats.header_lines,
            "end of input"
        );
        Ok(())
    }
}

impl<R: BufRead> Iterator for RecordIterator<'_, R> {
    type Item = Result<Record, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
