mod error;
mod grammar;
mod line;

pub use error::ValidationError;
pub use grammar::{parse_input, parse_term, parse_term_expression};
pub use line::{parse_line, ParsedLine, TermParser, WhitespaceTermParser};

/// Marks a trigger term as a prefix wildcard when it ends the term.
pub const WILDCARD: char = '*';

/// Anchors a trigger to the start or end of the query when it leads or
/// trails the trigger expression.
pub const BOUNDARY: char = '"';

/// Suffix marking a line as a trigger line in rules text.
pub const TRIGGER_SUFFIX: &str = "=>";
