use crate::types::{contains_placeholder, BoostDirection, Input, Instruction, Term};

use super::error::ValidationError;
use super::grammar::{self, parse_input, parse_term_expression};
use super::TRIGGER_SUFFIX;

/// The result of parsing one rule line: either a trigger or an instruction.
/// Callers branch on the variant; an invalid line never yields a partially
/// parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Input(Input),
    Instruction(Instruction),
}

/// Tokenizes the free text on the right-hand side of an instruction into
/// terms. Implementations must be deterministic and accept the same token
/// grammar as trigger terms, so placeholder references can be embedded.
pub trait TermParser {
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the text cannot be tokenized.
    fn parse(&self, text: &str) -> Result<Vec<Term>, ValidationError>;
}

/// The default term parser: splits on whitespace and applies the trigger
/// token grammar to each token.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTermParser;

impl TermParser for WhitespaceTermParser {
    fn parse(&self, text: &str) -> Result<Vec<Term>, ValidationError> {
        parse_term_expression(text)
    }
}

#[derive(Debug, Clone, Copy)]
enum Keyword {
    Filter,
    Up,
    Down,
    Delete,
    Decorate,
}

const KEYWORDS: [(Keyword, &str); 5] = [
    (Keyword::Filter, "filter"),
    (Keyword::Up, "up"),
    (Keyword::Down, "down"),
    (Keyword::Delete, "delete"),
    (Keyword::Decorate, "decorate"),
];

/// Strip `keyword` from the start of `line`, comparing ASCII
/// case-insensitively. ASCII folding keeps keyword recognition independent
/// of any process locale.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.get(..keyword.len())?;
    if head.eq_ignore_ascii_case(keyword) {
        Some(&line[keyword.len()..])
    } else {
        None
    }
}

fn split_keyword(line: &str) -> Option<(Keyword, &str)> {
    KEYWORDS
        .iter()
        .find_map(|(kw, text)| strip_keyword(line, text).map(|rest| (*kw, rest)))
}

/// Parse one rule line. A line ending in `=>` is a trigger and is parsed
/// with [`parse_input`]; a line starting with one of the instruction
/// keywords (`FILTER`, `UP`, `DOWN`, `DELETE`, `DECORATE`, any case) is an
/// instruction. `current_input` supplies trigger context for instructions
/// that need it (`DELETE`).
///
/// # Errors
///
/// Returns [`ValidationError`] for any malformed line.
pub fn parse_line(
    line: &str,
    current_input: Option<&Input>,
    term_parser: &dyn TermParser,
) -> Result<ParsedLine, ValidationError> {
    let line = line.trim();
    if let Some(trigger) = line.strip_suffix(TRIGGER_SUFFIX) {
        return parse_input(trigger).map(ParsedLine::Input);
    }
    let Some((keyword, rest)) = split_keyword(line) else {
        return Err(ValidationError::new(format!("cannot parse line: '{line}'")));
    };
    let instruction = match keyword {
        Keyword::Filter => parse_filter_instruction(rest, term_parser)?,
        Keyword::Up => parse_boost_instruction(rest, BoostDirection::Up, term_parser)?,
        Keyword::Down => parse_boost_instruction(rest, BoostDirection::Down, term_parser)?,
        Keyword::Delete => parse_delete_instruction(rest, current_input)?,
        Keyword::Decorate => parse_decorate_instruction(rest)?,
    };
    Ok(ParsedLine::Instruction(instruction))
}

fn expect_colon<'a>(rest: &'a str, what: &str) -> Result<&'a str, ValidationError> {
    rest.trim_start()
        .strip_prefix(':')
        .ok_or_else(|| ValidationError::new(format!("expected ':' after {what}")))
}

fn parse_filter_instruction(
    rest: &str,
    term_parser: &dyn TermParser,
) -> Result<Instruction, ValidationError> {
    let text = expect_colon(rest, "FILTER")?.trim();
    if text.is_empty() {
        return Err(ValidationError::new(
            "filter instruction requires a rewrite query",
        ));
    }
    let terms = term_parser.parse(text)?;
    Ok(Instruction::Filter { terms })
}

/// Parse the remainder of a boost line after the `UP`/`DOWN` keyword:
/// an optional parenthesized weight, a colon, and the rewrite text.
pub(super) fn parse_boost_instruction(
    rest: &str,
    direction: BoostDirection,
    term_parser: &dyn TermParser,
) -> Result<Instruction, ValidationError> {
    let mut rest = rest.trim_start();
    let weight = if rest.starts_with('(') {
        let weight = grammar::boost_weight(&mut rest).map_err(|_| {
            ValidationError::new(format!("cannot parse boost weight for {direction}"))
        })?;
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ValidationError::new("boost weight must be a positive number"));
        }
        Some(weight)
    } else {
        None
    };
    let text = expect_colon(rest, "boost direction")?.trim();
    if text.is_empty() {
        return Err(ValidationError::new(
            "boost instruction requires a rewrite query",
        ));
    }
    let query = term_parser.parse(text)?;
    let has_placeholder = query.iter().any(|t| contains_placeholder(t.content()));
    Ok(Instruction::Boost {
        direction,
        weight,
        query,
        has_placeholder,
    })
}

fn trigger_contains(input: &Input, term: &Term) -> bool {
    input.terms().iter().any(|t| {
        !t.is_prefix()
            && t.content() == term.content()
            && (term.field_names().is_none() || term.field_names() == t.field_names())
    })
}

fn parse_delete_instruction(
    rest: &str,
    current_input: Option<&Input>,
) -> Result<Instruction, ValidationError> {
    let text = expect_colon(rest, "DELETE")?.trim();
    let Some(input) = current_input else {
        return Err(ValidationError::new("delete instruction requires a trigger"));
    };
    if text.is_empty() {
        // Bare `DELETE:` removes the full trigger term sequence.
        if input.has_wildcard() {
            return Err(ValidationError::new("cannot delete a wildcard trigger"));
        }
        if input.terms().is_empty() {
            return Err(ValidationError::new("cannot delete an empty trigger"));
        }
        return Ok(Instruction::Delete {
            terms: input.terms().to_vec(),
        });
    }
    let terms = parse_term_expression(text)?;
    for term in &terms {
        if term.is_prefix() {
            return Err(ValidationError::new(
                "wildcard not allowed in delete instruction",
            ));
        }
        if !trigger_contains(input, term) {
            return Err(ValidationError::new(format!(
                "delete instruction must only contain terms of the trigger: '{term}'"
            )));
        }
    }
    Ok(Instruction::Delete { terms })
}

fn parse_decorate_instruction(rest: &str) -> Result<Instruction, ValidationError> {
    match rest.chars().next() {
        Some(':') => {
            let value = rest[1..].trim();
            if value.is_empty() {
                return Err(ValidationError::new("decorate instruction requires a value"));
            }
            Ok(Instruction::Decorate {
                key: None,
                value: value.to_owned(),
            })
        }
        Some('(') => {
            let inner = &rest[1..];
            let close = inner.find(')').ok_or_else(|| {
                ValidationError::new("missing closing parenthesis in decorate key")
            })?;
            let key = &inner[..close];
            if key.is_empty() {
                return Err(ValidationError::new("decorate key must not be empty"));
            }
            if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ValidationError::new(format!(
                    "decorate key contains a character that is not allowed: '{key}'"
                )));
            }
            let value = expect_colon(&inner[close + 1..], "decorate key")?.trim();
            if value.is_empty() {
                return Err(ValidationError::new("decorate instruction requires a value"));
            }
            Ok(Instruction::Decorate {
                key: Some(key.to_owned()),
                value: value.to_owned(),
            })
        }
        _ => Err(ValidationError::new(format!(
            "cannot parse decorate instruction: 'DECORATE{rest}'"
        ))),
    }
}
