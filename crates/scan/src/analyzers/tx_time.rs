use std::collections::HashMap;
use std::io::Write;

use ingest::time::{pretty_number, pretty_time};
use ingest::{Analyzer, Record};
use tracing::warn;

/// Measures how long each `begin … (id)` takes until the next message that
/// carries the same `(id)`.
pub struct TxTimeAnalyzer<W> {
    out: W,
    spans: HashMap<String, Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Span {
    id: String,
    start_ms: i64,
    end_ms: Option<i64>,
}

impl Span {
    fn duration(&self) -> Option<i64> {
        self.end_ms.map(|end| end.saturating_sub(self.start_ms))
    }
}

impl<W: Write> TxTimeAnalyzer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            spans: HashMap::new(),
        }
    }

    fn report(&mut self) -> std::io::Result<()> {
        let mut spans: Vec<&Span> = self.spans.values().collect();
        // Unfinished spans sort last.
        spans.sort_by(|a, b| {
            (a.duration().is_none(), a.duration(), &a.id).cmp(&(b.duration().is_none(), b.duration(), &b.id))
        });
        for span in spans {
            let end = span.end_ms.map(pretty_time).unwrap_or_else(|| "N/A".to_string());
            let duration = span
                .duration()
                .map(|d| format!("{} (msec)", pretty_number(d)))
                .unwrap_or_else(|| "N/A".to_string());
            writeln!(
                self.out,
                "id={} start={} end={} duration={}",
                span.id,
                pretty_time(span.start_ms),
                end,
                duration
            )?;
        }
        self.out.flush()
    }
}

/// Text between the first `(` and the following `)`, or to the end of the
/// message when unclosed. Empty without any `(`.
fn span_id(message: &str) -> &str {
    let Some(open) = message.find('(') else {
        return "";
    };
    let rest = &message[open + 1..];
    match rest.find(')') {
        Some(close) => &rest[..close],
        None => rest,
    }
}

impl<W: Write> Analyzer for TxTimeAnalyzer<W> {
    fn prepare(&mut self) -> anyhow::Result<()> {
        self.spans.clear();
        Ok(())
    }

    fn consume(&mut self, record: Record) -> anyhow::Result<()> {
        let message = record.message();
        if message.is_empty() {
            return Ok(());
        }
        let id = span_id(message);
        let time = record.timestamp_ms();

        if message.starts_with("begin") {
            let span = Span {
                id: id.to_string(),
                start_ms: time,
                end_ms: None,
            };
            if self.spans.insert(id.to_string(), span).is_some() {
                warn!(id, line_number = record.line_number(), "id has started twice");
            }
            return Ok(());
        }

        let Some(span) = self.spans.get_mut(id) else {
            warn!(id, line_number = record.line_number(), "id hasn't started");
            return Ok(());
        };
        if let Some(previous) = span.end_ms {
            warn!(
                id,
                first = %pretty_time(previous),
                second = %pretty_time(time),
                elapsed_ms = time.saturating_sub(previous),
                "span was already closed"
            );
        }
        span.end_ms = Some(time);
        Ok(())
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        self.report()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::{record, run};

    #[test]
    fn test_span_id() {
        assert_eq!(span_id("begin tx (42) now"), "42");
        assert_eq!(span_id("commit (abc"), "abc");
        assert_eq!(span_id("no id here"), "");
    }

    #[test]
    fn test_sorted_by_duration_unfinished_last() {
        let records = vec![
            record(1, 1_000, "t", "begin (a)"),
            record(2, 1_100, "t", "begin (b)"),
            record(3, 1_200, "t", "begin (c)"),
            record(4, 1_300, "t", "end (b)"),
            record(5, 3_000, "t", "end (a)"),
        ];
        let out = run(TxTimeAnalyzer::new, records);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "id=b start=00:00:01.100 end=00:00:01.300 duration=200 (msec)",
                "id=a start=00:00:01.000 end=00:00:03.000 duration=2,000 (msec)",
                "id=c start=00:00:01.200 end=N/A duration=N/A",
            ]
        );
    }

    #[test]
    fn test_unknown_and_empty_messages_are_ignored() {
        let records = vec![
            record(1, 0, "t", ""),
            record(2, 10, "t", "end (ghost)"),
            record(3, 20, "t", "begin (x)"),
            record(4, 25, "t", "end (x)"),
            record(5, 40, "t", "end (x)"),
        ];
        let out = run(TxTimeAnalyzer::new, records);
        assert_eq!(out, "id=x start=00:00:00.020 end=00:00:00.040 duration=20 (msec)\n");
    }

    #[test]
    fn test_restart_replaces_span() {
        let records = vec![
            record(1, 0, "t", "begin (x)"),
            record(2, 500, "t", "begin (x)"),
            record(3, 600, "t", "end (x)"),
        ];
        let out = run(TxTimeAnalyzer::new, records);
        assert!(out.contains("duration=100 (msec)"));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_extreme_epochs_saturate() {
        let records = vec![
            record(1, i64::MIN, "t", "begin (x)"),
            record(2, i64::MAX, "t", "end (x)"),
        ];
        let out = run(TxTimeAnalyzer::new, records);
        assert!(out.contains("duration=9,223,372,036,854,775,807 (msec)"));
    }
}
