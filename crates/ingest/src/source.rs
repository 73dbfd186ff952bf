use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Successive physical lines of a byte stream with a 1-based line counter.
///
/// Line terminators (`\n` or `\r\n`) are stripped. Bytes that are not valid
/// UTF-8 are replaced rather than rejected, so a stray binary blob in a log
/// never stops ingestion.
pub struct LineSource<R> {
    reader: R,
    line_number: u64,
    buffer: Vec<u8>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: Vec::new(),
        }
    }

    /// Number of the line most recently returned, 0 before the first read.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buffer.clear();
        if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
            return Ok(None);
        }
        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
        }
        self.line_number += 1;
        Ok(Some(String::from_utf8_lossy(&self.buffer).into_owned()))
    }
}

impl LineSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}
