// Field extraction shared by every header layout. Each function starts at
// the cursor's current position and leaves it just past the field and its
// trailing separator.

use super::cursor::LineCursor;
use super::model::ParseError;
use crate::time;

/// `YYYY-MM-DD`, or `None` when the token is not a date.
pub(crate) fn date(cursor: &mut LineCursor<'_>) -> Option<i64> {
    if !cursor.has_next() {
        return None;
    }
    time::parse_date(cursor.take_until(' '))
}

/// `HH:MM:SS,mmm`, or `None` when the token is not a time of day.
pub(crate) fn time_of_day(cursor: &mut LineCursor<'_>) -> Option<i64> {
    if !cursor.has_next() {
        return None;
    }
    time::parse_time_of_day(cursor.take_until(' '))
}

pub(crate) fn epoch(cursor: &mut LineCursor<'_>) -> Result<i64, ParseError> {
    assert_has_next(cursor, "timestamp")?;
    let token = cursor.take_until(' ');
    token.parse::<i64>().map_err(|_| ParseError::InvalidEpoch {
        value: token.to_string(),
        cursor: cursor.to_string(),
    })
}

pub(crate) fn level<'a>(cursor: &mut LineCursor<'a>) -> Result<&'a str, ParseError> {
    cursor.skip_spaces();
    assert_has_next(cursor, "level")?;
    Ok(cursor.take_until(' ').trim())
}

/// `[class]`: everything up to the first `]`. `[]` is rejected.
pub(crate) fn class<'a>(cursor: &mut LineCursor<'a>) -> Result<&'a str, ParseError> {
    assert_next_char(cursor, "class", '[')?;
    let class = cursor.take_through(']').ok_or_else(|| ParseError::Unterminated {
        field: "class",
        cursor: cursor.to_string(),
    })?;
    cursor.skip(1);
    non_empty(cursor, "class", class)
}

/// `(thread)`: up to the `)` that balances the opening one, so nested pairs
/// such as `pool-3-(thread-4)` stay inside the thread name.
pub(crate) fn thread<'a>(cursor: &mut LineCursor<'a>) -> Result<&'a str, ParseError> {
    assert_next_char(cursor, "thread", '(')?;
    let line = cursor.line();
    let start = cursor.position();
    let mut depth = 0usize;
    while cursor.has_next() {
        let end = cursor.position();
        match cursor.next_char()? {
            ')' if depth == 0 => {
                cursor.skip(1);
                return non_empty(cursor, "thread", &line[start..end]);
            }
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    Err(ParseError::Unterminated {
        field: "thread",
        cursor: cursor.to_string(),
    })
}

pub(crate) fn message<'a>(cursor: &mut LineCursor<'a>) -> &'a str {
    cursor.take_rest()
}

fn non_empty<'a>(cursor: &LineCursor<'_>, field: &'static str, value: &'a str) -> Result<&'a str, ParseError> {
    if value.is_empty() {
        return Err(ParseError::EmptyField {
            field,
            cursor: cursor.to_string(),
        });
    }
    Ok(value)
}

fn assert_has_next(cursor: &LineCursor<'_>, field: &'static str) -> Result<(), ParseError> {
    if cursor.has_next() {
        Ok(())
    } else {
        Err(ParseError::EndOfLine {
            field,
            cursor: cursor.to_string(),
        })
    }
}

/// Skip spaces, then require `open` as the next char and consume it.
fn assert_next_char(cursor: &mut LineCursor<'_>, field: &'static str, open: char) -> Result<(), ParseError> {
    assert_has_next(cursor, field)?;
    cursor.skip_spaces();
    match cursor.peek() {
        Some(c) if c == open => {
            cursor.skip(1);
            Ok(())
        }
        Some(found) => Err(ParseError::UnexpectedChar {
            field,
            expected: open,
            found,
            cursor: cursor.to_string(),
        }),
        None => Err(ParseError::EndOfLine {
            field,
            cursor: cursor.to_string(),
        }),
    }
}
