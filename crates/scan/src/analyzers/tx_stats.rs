use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use ingest::time::pretty_time;
use ingest::{Analyzer, Record};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Begin,
    Commit,
    Get,
    Put,
    CreateStats,
    EndStats,
}

impl Event {
    const ALL: [Event; 6] = [
        Event::Begin,
        Event::Commit,
        Event::Get,
        Event::Put,
        Event::CreateStats,
        Event::EndStats,
    ];

    fn prefix(&self) -> &'static str {
        match self {
            Event::Begin => "Begin transaction",
            Event::Commit => "Commit transaction",
            Event::Get => "Invoked with command GetKeyValueCommand",
            Event::Put => "Invoked with command PutKeyValueCommand",
            Event::CreateStats => "Created transaction statistics",
            Event::EndStats => "Terminating transaction",
        }
    }

    fn classify(message: &str) -> Option<Event> {
        Event::ALL.into_iter().find(|event| message.starts_with(event.prefix()))
    }
}

/// A point in the log: timestamp and the line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mark {
    ms: i64,
    line: u64,
}

#[derive(Debug, Clone, Default)]
struct Transaction {
    thread: String,
    begin: Option<Mark>,
    commit: Option<Mark>,
    create_stats: Option<i64>,
    end_stats: Option<i64>,
    first_get: Option<i64>,
    first_put: Option<i64>,
}

impl Transaction {
    fn new(thread: &str) -> Self {
        Self {
            thread: thread.to_string(),
            ..Default::default()
        }
    }

    fn duration(&self) -> Option<i64> {
        Some(self.commit?.ms.saturating_sub(self.begin?.ms))
    }

    fn is_valid(&self) -> bool {
        self.begin.is_some() && self.commit.is_some() && self.create_stats.is_some() && self.end_stats.is_some()
    }

    /// Record `event`. Returns `false` when a once-only event repeats.
    fn apply(&mut self, event: Event, record: &Record) -> bool {
        let mark = Mark {
            ms: record.timestamp_ms(),
            line: record.line_number(),
        };
        match event {
            Event::Begin => set_once(&mut self.begin, mark),
            Event::Commit => set_once(&mut self.commit, mark),
            Event::CreateStats => set_once(&mut self.create_stats, mark.ms),
            Event::EndStats => set_once(&mut self.end_stats, mark.ms),
            // Only the first get/put counts; later ones are expected.
            Event::Get => {
                self.first_get.get_or_insert(mark.ms);
                true
            }
            Event::Put => {
                self.first_put.get_or_insert(mark.ms);
                true
            }
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

fn pretty_mark(mark: Option<Mark>) -> String {
    match mark {
        Some(mark) => format!("{}@{}", pretty_time(mark.ms), mark.line),
        None => "N/A".to_string(),
    }
}

fn pretty_opt(ms: Option<i64>) -> String {
    ms.map(pretty_time).unwrap_or_else(|| "N/A".to_string())
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "thread={} begin={} commit={} create_stats={} end_stats={} first_get={} first_put={}",
            self.thread,
            pretty_mark(self.begin),
            pretty_mark(self.commit),
            pretty_opt(self.create_stats),
            pretty_opt(self.end_stats),
            pretty_opt(self.first_get),
            pretty_opt(self.first_put),
        )
    }
}

/// Per-thread transaction lifecycle: begin, commit, first get/put and the
/// statistics bracket.
///
/// A thread holds one open transaction at a time; a new `Begin` on the same
/// thread closes the previous one.
pub struct TxStatsAnalyzer<W> {
    out: W,
    open: HashMap<String, Transaction>,
    closed: Vec<Transaction>,
}

impl<W: Write> TxStatsAnalyzer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            open: HashMap::new(),
            closed: Vec::new(),
        }
    }

    fn report(&mut self) -> std::io::Result<()> {
        let mut all = std::mem::take(&mut self.closed);
        all.extend(self.open.drain().map(|(_, tx)| tx));
        // Incomplete transactions sort last.
        all.sort_by(|a, b| {
            let key = |tx: &Transaction| (tx.duration().is_none(), tx.duration(), tx.begin.map(|m| m.line));
            key(a).cmp(&key(b))
        });

        for tx in &all {
            writeln!(self.out, "{tx}")?;
        }
        writeln!(self.out, "##### NOT VALID #####")?;
        for tx in all.iter().filter(|tx| !tx.is_valid()) {
            writeln!(self.out, "{tx}")?;
        }
        writeln!(self.out, "##### END #####")?;
        self.out.flush()
    }
}

impl<W: Write> Analyzer for TxStatsAnalyzer<W> {
    fn prepare(&mut self) -> anyhow::Result<()> {
        self.open.clear();
        self.closed.clear();
        Ok(())
    }

    fn consume(&mut self, record: Record) -> anyhow::Result<()> {
        let Some(event) = Event::classify(record.message()) else {
            return Ok(());
        };
        let thread = record.thread();

        if event == Event::Begin {
            if let Some(previous) = self.open.remove(thread) {
                self.closed.push(previous);
            }
            let mut tx = Transaction::new(thread);
            tx.apply(event, &record);
            self.open.insert(thread.to_string(), tx);
            return Ok(());
        }

        let Some(tx) = self.open.get_mut(thread) else {
            warn!(thread, line_number = record.line_number(), ?event, "transaction does not exist");
            return Ok(());
        };
        if !tx.apply(event, &record) {
            warn!(thread, line_number = record.line_number(), ?event, "duplicated transaction event");
        }
        Ok(())
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        self.report()?;
        Ok(())
    }
}
