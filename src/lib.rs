mod apply;
mod compile;
mod index;
mod parse;
mod types;

pub use apply::{apply, RewriteAction};
pub use index::{RuleIndex, RuleIndexBuilder, TriggerMatch};
pub use parse::{
    parse_input, parse_line, parse_term, parse_term_expression, ParsedLine, TermParser,
    ValidationError, WhitespaceTermParser, BOUNDARY, TRIGGER_SUFFIX, WILDCARD,
};
pub use types::{
    BoostDirection, CompileError, Input, Instruction, Instructions, InvalidTermError, Properties,
    QueryToken, Term,
};
