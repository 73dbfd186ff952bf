use crate::parser::cursor::LineCursor;
use crate::parser::fields;
use crate::parser::traits::{may_be_header, LineParser, LogFormat, ParseError};
use crate::record::Record;

/// Parser for the test-suite server logs in any of the three `LogFormat`
/// layouts.
///
/// A line is a header when its date/time prefix parses: the date and time
/// for `Dated` and `Epoch`, the time alone for `TimeOnly`. Everything after
/// the prefix must then be well formed.
#[derive(Debug, Clone, Copy)]
pub struct IspnParser {
    format: LogFormat,
}

impl IspnParser {
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }

    /// Milliseconds encoded in the date/time prefix, `None` if the prefix
    /// does not parse.
    fn prefix(&self, cursor: &mut LineCursor<'_>) -> Option<i64> {
        match self.format {
            LogFormat::Dated | LogFormat::Epoch => {
                let date = fields::date(cursor)?;
                let time = fields::time_of_day(cursor)?;
                Some(date + time)
            }
            LogFormat::TimeOnly => fields::time_of_day(cursor),
        }
    }
}

impl LineParser for IspnParser {
    fn parse_line(&self, line_number: u64, line: &str) -> Result<Option<Record>, ParseError> {
        if !may_be_header(line) {
            return Ok(None);
        }
        let mut cursor = LineCursor::new(line);
        let Some(prefix_ms) = self.prefix(&mut cursor) else {
            return Ok(None);
        };

        let record = match self.format {
            LogFormat::Dated | LogFormat::TimeOnly => {
                let level = fields::level(&mut cursor)?;
                let thread = fields::thread(&mut cursor)?;
                let class = fields::class(&mut cursor)?;
                Record::new(line_number, prefix_ms, level, class, thread, fields::message(&mut cursor))
            }
            LogFormat::Epoch => {
                // the epoch field wins over the date/time prefix
                let timestamp_ms = fields::epoch(&mut cursor)?;
                let level = fields::level(&mut cursor)?;
                let class = fields::class(&mut cursor)?;
                let thread = fields::thread(&mut cursor)?;
                Record::new(line_number, timestamp_ms, level, class, thread, fields::message(&mut cursor))
            }
        };
        Ok(Some(record))
    }

    fn name(&self) -> &'static str {
        "ispn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(format: LogFormat, line: &str) -> Option<Record> {
        IspnParser::new(format).parse_line(1, line).unwrap()
    }

    // ── TimeOnly ────────────────────────────────────────────────

    #[test]
    fn test_time_only_header() {
        let record = parse(LogFormat::TimeOnly, "12:34:56,789 INFO  (worker-1) [com.x.Y] hello").unwrap();
        assert_eq!(record.line_number(), 1);
        assert_eq!(record.timestamp_ms(), 45_296_789);
        assert_eq!(record.level(), "INFO");
        assert_eq!(record.thread(), "worker-1");
        assert_eq!(record.class_name(), "com.x.Y");
        assert_eq!(record.message(), "hello");
    }

    #[test]
    fn test_time_only_nested_thread() {
        let record = parse(LogFormat::TimeOnly, "12:34:56,789 DEBUG (pool-3-(thread-4)) [org.Foo] started (x)").unwrap();
        assert_eq!(record.thread(), "pool-3-(thread-4)");
        assert_eq!(record.class_name(), "org.Foo");
        assert_eq!(record.message(), "started (x)");
    }

    #[test]
    fn test_time_only_declines_dated_line() {
        assert!(parse(LogFormat::TimeOnly, "2024-01-02 03:04:05,006 INFO (t) [C] m").is_none());
    }

    // ── Dated ───────────────────────────────────────────────────

    #[test]
    fn test_dated_header() {
        let record = parse(LogFormat::Dated, "2024-01-02 03:04:05,006 ERROR (main) [org.Foo] boom").unwrap();
        assert_eq!(record.timestamp_ms(), 1_704_153_600_000 + 11_045_006);
        assert_eq!(record.level(), "ERROR");
        assert_eq!(record.thread(), "main");
        assert_eq!(record.class_name(), "org.Foo");
        assert_eq!(record.message(), "boom");
    }

    #[test]
    fn test_dated_declines_time_only_line() {
        assert!(parse(LogFormat::Dated, "12:34:56,789 INFO (t) [C] m").is_none());
    }

    #[test]
    fn test_dated_requires_time_after_date() {
        assert!(parse(LogFormat::Dated, "2024-01-02 not-a-time INFO (t) [C] m").is_none());
    }

    // ── Epoch ───────────────────────────────────────────────────

    #[test]
    fn test_epoch_field_overrides_prefix() {
        let record = parse(LogFormat::Epoch, "2024-01-02 03:04:05,006 1700000000000 WARN [C] (t) msg").unwrap();
        assert_eq!(record.timestamp_ms(), 1_700_000_000_000);
        assert_eq!(record.level(), "WARN");
        assert_eq!(record.class_name(), "C");
        assert_eq!(record.thread(), "t");
        assert_eq!(record.message(), "msg");
    }

    #[test]
    fn test_epoch_invalid_number_is_structural() {
        let err = IspnParser::new(LogFormat::Epoch)
            .parse_line(1, "2024-01-02 03:04:05,006 soon WARN [C] (t) msg")
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidEpoch { .. }));
    }

    // ── Rejections and faults ───────────────────────────────────

    #[test]
    fn test_non_headers_are_declined() {
        for format in [LogFormat::Dated, LogFormat::Epoch, LogFormat::TimeOnly] {
            assert!(parse(format, "").is_none());
            assert!(parse(format, "\tat A.b(A.java:1)").is_none());
            assert!(parse(format, " 12:34:56,789 INFO (t) [C] m").is_none());
            assert!(parse(format, "java.lang.IllegalStateException: boom").is_none());
        }
    }

    #[test]
    fn test_unterminated_class_is_an_error() {
        let err = IspnParser::new(LogFormat::TimeOnly)
            .parse_line(7, "12:34:56,789 INFO (t) [com.x.Y message")
            .unwrap_err();
        assert!(matches!(err, ParseError::Unterminated { field: "class", .. }));
    }

    #[test]
    fn test_unterminated_thread_is_an_error() {
        let err = IspnParser::new(LogFormat::Dated)
            .parse_line(7, "2024-01-02 03:04:05,006 INFO (pool-(1) [C] m")
            .unwrap_err();
        assert!(matches!(err, ParseError::Unterminated { field: "thread", .. }));
    }

    #[test]
    fn test_empty_thread_is_an_error() {
        let err = IspnParser::new(LogFormat::Epoch)
            .parse_line(4, "2024-01-02 03:04:05,006 1704164645006 WARN [C] () msg")
            .unwrap_err();
        assert!(matches!(err, ParseError::EmptyField { field: "thread", .. }));
    }

    #[test]
    fn test_round_trip_of_single_line_headers() {
        let lines = [
            (LogFormat::TimeOnly, "12:34:56,789 INFO (worker-1) [com.x.Y] hello"),
            (LogFormat::Dated, "2024-01-02 03:04:05,006 TRACE (pool-3-(thread-4)) [org.Foo] a b  c"),
            (LogFormat::Epoch, "2024-01-02 03:04:05,006 1704164645006 WARN [C] (t) msg"),
        ];
        for (format, line) in lines {
            let record = parse(format, line).unwrap();
            assert_eq!(record.render(format), line);
        }
    }

    #[test]
    fn test_round_trip_normalizes_level_whitespace() {
        let record = parse(LogFormat::TimeOnly, "12:34:56,789 INFO  (worker-1) [com.x.Y] hello").unwrap();
        assert_eq!(record.render(LogFormat::TimeOnly), "12:34:56,789 INFO (worker-1) [com.x.Y] hello");
    }
}
