/// Header parsing for the supported server log layouts
///
/// A parser looks at one physical line and either recognizes it as the
/// header of a new record or declines it, in which case the record iterator
/// treats the line as continuation content.
///
/// # Architecture
///
/// - `traits.rs`: the `LineParser` trait every layout implements
/// - `cursor.rs`: position-tracked cursor over a single line
/// - `fields.rs`: field extraction shared by all layouts
/// - `formats/`: the individual layouts
/// - `model.rs`: format selector, blank-line policy and parse errors
///
/// # Guarantees
///
/// All parsers are:
/// - Side-effect free and deterministic
/// - Lenient on non-header lines (they are declined, never rejected)
/// - Strict on broken headers (a bracketed field without its close is an error)

pub mod cursor;
pub mod formats;
pub mod model;
pub mod traits;
pub(crate) mod fields;

pub use cursor::LineCursor;
pub use formats::{IspnParser, TorqueBoxParser};
pub use model::{BlankLines, LogFormat, ParseError};
pub use traits::LineParser;
