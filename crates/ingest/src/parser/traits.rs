pub use super::model::{BlankLines, LogFormat, ParseError};
use crate::record::Record;

pub trait LineParser: Send + Sync {
    /// Parse one physical line.
    ///
    /// Returns `Ok(None)` when the line is not a record header (blank,
    /// whitespace-led, or the date/time prefix does not parse). Errors are
    /// reserved for lines whose prefix parses but whose remaining header
    /// fields are structurally broken.
    fn parse_line(&self, line_number: u64, line: &str) -> Result<Option<Record>, ParseError>;

    /// Short identifier used in diagnostics.
    fn name(&self) -> &'static str;

    /// What an empty line means for this layout.
    fn blank_lines(&self) -> BlankLines {
        BlankLines::Continue
    }
}

/// Header lines never start with whitespace.
pub(crate) fn may_be_header(line: &str) -> bool {
    line.chars().next().is_some_and(|c| !c.is_whitespace())
}
