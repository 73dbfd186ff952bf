use std::io::Write;

use anyhow::Context;
use ingest::time::pretty_time;
use ingest::{Analyzer, Record};

const PREFIX: &str = "Add";
const SUFFIX: &str = "RO_TX_SUCCESSFUL_EXECUTION_TIME";

/// CSV of read-only transaction execution times,
/// from `Add <duration> … RO_TX_SUCCESSFUL_EXECUTION_TIME` messages.
pub struct TxReadOnlyAnalyzer<W> {
    out: W,
}

impl<W: Write> TxReadOnlyAnalyzer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

/// Shortest decimal form that always carries a fraction (`1500.0`, `2.5`),
/// switching to `1.5E7` notation outside `[1e-3, 1e7)`.
fn decimal(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let plain = value.to_string();
        return if plain.contains('.') { plain } else { format!("{plain}.0") };
    }
    let scientific = format!("{value:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => scientific,
    }
}

impl<W: Write> Analyzer for TxReadOnlyAnalyzer<W> {
    fn prepare(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "timestamp(ms),timestamp(date),duration(nanoseconds)")?;
        Ok(())
    }

    fn consume(&mut self, record: Record) -> anyhow::Result<()> {
        let message = record.message();
        if !(message.starts_with(PREFIX) && message.ends_with(SUFFIX)) {
            return Ok(());
        }
        let token = message.split(' ').nth(1).unwrap_or("");
        let duration: f64 = token
            .parse()
            .with_context(|| format!("invalid duration '{token}' at line {}", record.line_number()))?;
        writeln!(
            self.out,
            "{},{},{}",
            record.timestamp_ms(),
            pretty_time(record.timestamp_ms()),
            decimal(duration)
        )?;
        Ok(())
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
