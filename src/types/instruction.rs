use std::fmt;

use super::term::Term;

/// Marker introducing a placeholder reference inside rewrite text.
/// `$1` refers to the wildcard capture of the current trigger.
pub(crate) const PLACEHOLDER: char = '$';

/// Direction of a boost instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostDirection {
    Up,
    Down,
}

impl fmt::Display for BoostDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoostDirection::Up => write!(f, "UP"),
            BoostDirection::Down => write!(f, "DOWN"),
        }
    }
}

/// A single rewrite action attached to a trigger. Immutable once parsed;
/// instruction application dispatches on the variant tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Boost matching documents up or down, optionally weighted, using the
    /// rewritten sub-query. `has_placeholder` records whether the query
    /// references the trigger's wildcard capture.
    Boost {
        direction: BoostDirection,
        weight: Option<f64>,
        query: Vec<Term>,
        has_placeholder: bool,
    },
    /// Restrict results to those matching the given terms.
    Filter { terms: Vec<Term> },
    /// Remove the given terms from the original query.
    Delete { terms: Vec<Term> },
    /// Attach a key/value annotation to the query; no retrieval effect.
    Decorate { key: Option<String>, value: String },
}

impl Instruction {
    /// Whether this is a boost instruction whose rewrite query contains a
    /// placeholder reference.
    #[must_use]
    pub fn has_placeholder_in_boost_query(&self) -> bool {
        matches!(
            self,
            Instruction::Boost {
                has_placeholder: true,
                ..
            }
        )
    }
}

/// Whether `content` contains a placeholder reference (`$` immediately
/// followed by a digit).
pub(crate) fn contains_placeholder(content: &str) -> bool {
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == PLACEHOLDER && chars.peek().is_some_and(char::is_ascii_digit) {
            return true;
        }
    }
    false
}
