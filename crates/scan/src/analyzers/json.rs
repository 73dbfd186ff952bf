use std::io::Write;

use ingest::{Analyzer, Record};

/// Writes every record as one JSON object per line.
pub struct JsonAnalyzer<W> {
    out: W,
}

impl<W: Write> JsonAnalyzer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Analyzer for JsonAnalyzer<W> {
    fn consume(&mut self, record: Record) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
