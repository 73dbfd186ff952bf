use std::io;

use thiserror::Error;

use crate::parser::ParseError;

/// Fatal stream fault. Once returned the iterator yields nothing more.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("I/O error while reading log")]
    Io(#[from] io::Error),

    #[error("Broken record header at line {line_number}")]
    Parse {
        line_number: u64,
        #[source]
        source: ParseError,
    },
}

impl StreamError {
    /// Line the fault was detected on, if it came from the parser.
    pub fn line_number(&self) -> Option<u64> {
        match self {
            StreamError::Io(_) => None,
            StreamError::Parse { line_number, .. } => Some(*line_number),
        }
    }
}
