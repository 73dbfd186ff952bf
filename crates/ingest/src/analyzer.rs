use crate::record::Record;

/// A consumer of records with a three-phase lifecycle.
///
/// The driver calls `prepare` once, `consume` once per record in stream
/// order, and `finalize` exactly once on the way out, even when `prepare`
/// or `consume` failed. After a failed `consume` no further records are
/// delivered.
pub trait Analyzer {
    /// Allocate state, open sinks, print headers.
    fn prepare(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn consume(&mut self, record: Record) -> anyhow::Result<()>;

    /// Close sinks and print summaries.
    fn finalize(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<A: Analyzer + ?Sized> Analyzer for Box<A> {
    fn prepare(&mut self) -> anyhow::Result<()> {
        (**self).prepare()
    }

    fn consume(&mut self, record: Record) -> anyhow::Result<()> {
        (**self).consume(record)
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        (**self).finalize()
    }
}
