use std::io::Write;

use ingest::{Analyzer, Record};

const GET_COMMAND: &str = "Invoked with command GetKeyValueCommand";

/// Gap between consecutive `GetKeyValueCommand` invocations.
pub struct AvgEventIntervalAnalyzer<W> {
    out: W,
    last_ms: Option<i64>,
    counter: u64,
}

impl<W: Write> AvgEventIntervalAnalyzer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_ms: None,
            counter: 0,
        }
    }
}

impl<W: Write> Analyzer for AvgEventIntervalAnalyzer<W> {
    fn prepare(&mut self) -> anyhow::Result<()> {
        self.last_ms = None;
        self.counter = 0;
        writeln!(self.out, "OpNumber,timestamp,duration")?;
        Ok(())
    }

    fn consume(&mut self, record: Record) -> anyhow::Result<()> {
        if !record.message().starts_with(GET_COMMAND) {
            return Ok(());
        }
        let time = record.timestamp_ms();
        let gap = self.last_ms.map_or(0, |last| time.saturating_sub(last));
        writeln!(self.out, "{},{},{}", self.counter, time, gap)?;
        self.last_ms = Some(time);
        self.counter += 1;
        Ok(())
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
