use serde::Serialize;

/// Counters kept by the record iterator while it drains a stream.
///
/// On a stream that drained cleanly, `lines_read` equals `header_lines +
/// continuation_lines + dropped_lines`, plus one when a blank line
/// terminated the stream. After a broken header the faulting line is counted
/// in `lines_read` only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    /// Physical lines pulled from the source
    pub lines_read: u64,
    /// Lines that parsed as a record header
    pub header_lines: u64,
    /// Lines folded into the preceding record's message
    pub continuation_lines: u64,
    /// Lines discarded before the first header
    pub dropped_lines: u64,
    /// Records handed out by `next_record`
    pub records_emitted: u64,
}
