use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Write;

use ingest::{Analyzer, Record};
use tracing::warn;

use crate::conf::LockConfig;

const SUCCESS: &str = "SUCCESS";
// The shared variants contain these as substrings.
const ACQUIRE: &str = "tryAcquire";
const RELEASE: &str = "tryRelease";

/// One successful or failed lock operation:
/// `<tx> <op> <…> <SUCCESS|…> … (<lock id>) …`.
#[derive(Debug, PartialEq, Eq)]
struct LockEntry<'a> {
    transaction: &'a str,
    lock_id: &'a str,
    success: bool,
}

impl<'a> LockEntry<'a> {
    fn parse(message: &'a str) -> Option<Self> {
        let mut tokens = message.split(' ');
        let transaction = tokens.next()?;
        let status = tokens.nth(2)?;

        let open = message.find(['(', ')'])?;
        let rest = &message[open + 1..];
        let lock_id = match rest.find(['(', ')']) {
            Some(close) => &rest[..close],
            None => rest,
        };
        Some(Self {
            transaction,
            lock_id,
            success: status == SUCCESS,
        })
    }
}

/// Pairs lock acquisitions with releases per transaction and reports locks
/// that were released twice or never released.
pub struct LockAnalyzer<W> {
    out: W,
    /// Empty means every lock.
    filter: HashSet<String>,
    held: BTreeMap<String, BTreeSet<String>>,
}

impl<W: Write> LockAnalyzer<W> {
    pub fn new(config: &LockConfig, out: W) -> Self {
        Self {
            out,
            filter: config.lock_ids.iter().cloned().collect(),
            held: BTreeMap::new(),
        }
    }

    fn tracked(&self, entry: &LockEntry<'_>) -> bool {
        entry.success && (self.filter.is_empty() || self.filter.contains(entry.lock_id))
    }

    fn report(&mut self) -> std::io::Result<()> {
        let mut errors = 0usize;
        for (transaction, locks) in &self.held {
            if locks.is_empty() {
                continue;
            }
            errors += 1;
            let pending: Vec<&str> = locks.iter().map(String::as_str).collect();
            writeln!(
                self.out,
                "Transaction {transaction} has pending locks: [{}]",
                pending.join(", ")
            )?;
        }
        writeln!(self.out, "Error found: {errors}")?;
        self.out.flush()
    }
}

impl<W: Write> Analyzer for LockAnalyzer<W> {
    fn prepare(&mut self) -> anyhow::Result<()> {
        self.held.clear();
        Ok(())
    }

    fn consume(&mut self, record: Record) -> anyhow::Result<()> {
        let message = record.message();
        let acquire = message.contains(ACQUIRE);
        if !acquire && !message.contains(RELEASE) {
            return Ok(());
        }
        let Some(entry) = LockEntry::parse(message) else {
            return Ok(());
        };
        if !self.tracked(&entry) {
            return Ok(());
        }

        let locks = self.held.entry(entry.transaction.to_string()).or_default();
        if acquire {
            locks.insert(entry.lock_id.to_string());
        } else if !locks.remove(entry.lock_id) {
            warn!(
                transaction = entry.transaction,
                lock_id = entry.lock_id,
                line_number = record.line_number(),
                "transaction released lock twice"
            );
        }
        Ok(())
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        self.report()?;
        Ok(())
    }
}
