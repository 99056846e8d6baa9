use winnow::ascii::{float, multispace0};
use winnow::combinator::{alt, delimited, opt, separated, terminated};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::take_while;

use crate::types::{Input, InvalidTermError, Term};

use super::error::ValidationError;
use super::{BOUNDARY, WILDCARD};

// -- Field prefixes ---------------------------------------------------------

fn field_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

fn braced_field_list(input: &mut &str) -> ModalResult<Vec<String>> {
    delimited(
        '{',
        separated(
            1..,
            delimited(multispace0, field_name.map(str::to_owned), multispace0),
            ',',
        ),
        '}',
    )
    .parse_next(input)
}

fn single_field(input: &mut &str) -> ModalResult<Vec<String>> {
    field_name.map(|f: &str| vec![f.to_owned()]).parse_next(input)
}

/// `f1:` or `{f1, f2}:`, the optional field restriction before a term.
fn field_prefix(input: &mut &str) -> ModalResult<Vec<String>> {
    terminated(alt((braced_field_list, single_field)), ':').parse_next(input)
}

/// `(5)` / `(0.5)`, the parenthesized weight after `UP`/`DOWN`.
pub(super) fn boost_weight(input: &mut &str) -> ModalResult<f64> {
    delimited(('(', multispace0), float, (multispace0, ')')).parse_next(input)
}

// -- Term grammar -----------------------------------------------------------

/// Parse a single term token: `[{f1[,f2...]}:|field:]content[*]`.
///
/// # Errors
///
/// Returns [`InvalidTermError`] if the content is empty, including the
/// wildcard-only forms `*`, `f1:*` and `{f1,f2}:*`.
pub fn parse_term(token: &str) -> Result<Term, InvalidTermError> {
    let mut rest = token;
    let fields = opt(field_prefix).parse_next(&mut rest).unwrap_or_default();
    let (content, is_prefix) = match rest.strip_suffix(WILDCARD) {
        Some(prefix) => (prefix, true),
        None => (rest, false),
    };
    let term = if is_prefix {
        Term::prefix(content, fields)
    } else {
        Term::new(content, fields)
    };
    term.map_err(|e| e.with_token(token))
}

/// Parse whitespace-separated term tokens into an ordered term sequence.
///
/// Wildcard *placement* is not checked here: `abc* def` is a valid term
/// expression even though it is not a valid trigger. [`parse_input`]
/// enforces placement.
///
/// # Errors
///
/// Returns [`ValidationError`] if any token is not a valid term.
pub fn parse_term_expression(text: &str) -> Result<Vec<Term>, ValidationError> {
    text.split_whitespace()
        .map(|token| parse_term(token).map_err(ValidationError::from))
        .collect()
}

/// Parse a trigger expression: optional leading/trailing boundary marker
/// around a term expression.
///
/// # Errors
///
/// Returns [`ValidationError`] on an invalid term, a wildcard in non-final
/// position, or a wildcard combined with a right boundary.
pub fn parse_input(text: &str) -> Result<Input, ValidationError> {
    let mut rest = text.trim();
    let mut left = false;
    let mut right = false;
    if let Some(stripped) = rest.strip_prefix(BOUNDARY) {
        left = true;
        rest = stripped;
    }
    if let Some(stripped) = rest.strip_suffix(BOUNDARY) {
        right = true;
        rest = stripped;
    }
    let terms = parse_term_expression(rest)?;
    Input::new(terms, left, right)
}
