// Log ingestion core: line source, header parsers, record assembly and
// analyzer dispatch.

pub mod analyzer;
pub mod driver;
pub mod parser;
pub mod record;
pub mod source;
pub mod stream;
pub mod time;

pub use analyzer::Analyzer;
pub use driver::{DriveError, DriveSummary, Driver};
pub use parser::{BlankLines, LineCursor, LineParser, LogFormat, ParseError};
pub use record::{Record, RecordBuilder};
pub use source::LineSource;
pub use stream::{RecordIterator, StreamError, StreamStats};
