use crate::parser::cursor::LineCursor;
use crate::parser::fields;
use crate::parser::traits::{may_be_header, BlankLines, LineParser, ParseError};
use crate::record::Record;

/// Parser for application-server logs laid out as
/// `HH:MM:SS,mmm LEVEL [class] (thread) message`.
///
/// These logs end at the first empty line, so the default blank-line policy
/// is `Terminate`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TorqueBoxParser;

impl LineParser for TorqueBoxParser {
    fn parse_line(&self, line_number: u64, line: &str) -> Result<Option<Record>, ParseError> {
        if !may_be_header(line) {
            return Ok(None);
        }
        let mut cursor = LineCursor::new(line);
        let Some(timestamp_ms) = fields::time_of_day(&mut cursor) else {
            return Ok(None);
        };
        let level = fields::level(&mut cursor)?;
        let class = fields::class(&mut cursor)?;
        let thread = fields::thread(&mut cursor)?;
        Ok(Some(Record::new(
            line_number,
            timestamp_ms,
            level,
            class,
            thread,
            fields::message(&mut cursor),
        )))
    }

    fn name(&self) -> &'static str {
        "torquebox"
    }

    fn blank_lines(&self) -> BlankLines {
        BlankLines::Terminate
    }
}
