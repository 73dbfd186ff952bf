use std::fmt;

use super::model::ParseError;

/// Position-tracked cursor over one physical line.
///
/// The cursor borrows the line and hands out sub-slices of it, so field
/// extraction never copies. Positions are byte offsets that always sit on
/// a char boundary, except after `skip` runs past the end of the line.
#[derive(Debug, Clone)]
pub struct LineCursor<'a> {
    line: &'a str,
    position: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { line, position: 0 }
    }

    pub fn line(&self) -> &'a str {
        self.line
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn has_next(&self) -> bool {
        self.position < self.line.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Advance one char and return it.
    ///
    /// Calling this at end of line is a caller bug; parsers check
    /// `has_next` first.
    pub fn next_char(&mut self) -> Result<char, ParseError> {
        match self.peek() {
            Some(c) => {
                self.position += c.len_utf8();
                Ok(c)
            }
            None => Err(ParseError::EndOfLine {
                field: "char",
                cursor: self.to_string(),
            }),
        }
    }

    /// Advance `chars` characters. Past the end the position keeps growing.
    pub fn skip(&mut self, chars: usize) {
        for _ in 0..chars {
            self.position += self.peek().map_or(1, char::len_utf8);
        }
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn skip_spaces(&mut self) {
        while self.peek() == Some(' ') {
            self.position += 1;
        }
    }

    /// Everything from the current position to end of line.
    pub fn rest(&self) -> &'a str {
        self.line.get(self.position..).unwrap_or("")
    }

    /// Consume up to and including the next `delimiter` and return the text
    /// before it. Without a delimiter the rest of the line is consumed.
    pub fn take_until(&mut self, delimiter: char) -> &'a str {
        let rest = self.rest();
        match rest.find(delimiter) {
            Some(idx) => {
                self.position += idx + delimiter.len_utf8();
                &rest[..idx]
            }
            None => {
                self.position = self.position.max(self.line.len());
                rest
            }
        }
    }

    /// Like `take_until`, but leaves the cursor untouched and returns `None`
    /// when the delimiter never shows up.
    pub fn take_through(&mut self, delimiter: char) -> Option<&'a str> {
        let rest = self.rest();
        let idx = rest.find(delimiter)?;
        self.position += idx + delimiter.len_utf8();
        Some(&rest[..idx])
    }

    pub fn take_rest(&mut self) -> &'a str {
        let rest = self.rest();
        self.position = self.position.max(self.line.len());
        rest
    }
}

impl fmt::Display for LineCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineCursor{{line={}, position={}}}", self.line, self.position)
    }
}
