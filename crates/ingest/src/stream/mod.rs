//! Stream: assembles records from a line source, folding continuation lines
//! into the header that introduced them.

pub mod error;
pub mod iter;
pub mod metrics;

pub use error::StreamError;
pub use iter::RecordIterator;
pub use metrics::StreamStats;
