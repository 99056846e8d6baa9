use std::fmt;

use crate::parse::{ValidationError, BOUNDARY, WILDCARD};

use super::term::Term;

/// The left-hand side of a rule: an ordered term sequence plus boundary
/// anchoring flags. Constructed once by the line compiler (or by hand via
/// [`Input::new`]) and immutable thereafter; owned by the trigger index
/// after indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    terms: Vec<Term>,
    requires_left_boundary: bool,
    requires_right_boundary: bool,
}

impl Input {
    /// Build an input, enforcing the wildcard placement invariants:
    /// a wildcard term may only be the last term, and a wildcard input may
    /// not also require a right boundary.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a wildcard invariant is violated.
    pub fn new(
        terms: Vec<Term>,
        requires_left_boundary: bool,
        requires_right_boundary: bool,
    ) -> Result<Self, ValidationError> {
        if let Some(pos) = terms.iter().position(Term::is_prefix) {
            if pos + 1 != terms.len() {
                return Err(ValidationError::new(format!(
                    "wildcard {WILDCARD} is only allowed in the last term of an expression"
                )));
            }
            if requires_right_boundary {
                return Err(ValidationError::new(format!(
                    "{WILDCARD} cannot be combined with right boundary"
                )));
            }
        }
        Ok(Self {
            terms,
            requires_left_boundary,
            requires_right_boundary,
        })
    }

    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    #[must_use]
    pub fn requires_left_boundary(&self) -> bool {
        self.requires_left_boundary
    }

    #[must_use]
    pub fn requires_right_boundary(&self) -> bool {
        self.requires_right_boundary
    }

    /// Whether the last term is a prefix wildcard.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.terms.last().is_some_and(Term::is_prefix)
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.requires_left_boundary {
            write!(f, "{BOUNDARY}")?;
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{term}")?;
        }
        if self.requires_right_boundary {
            write!(f, "{BOUNDARY}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(content: &str) -> Term {
        Term::new(content, None).unwrap()
    }

    fn prefix(content: &str) -> Term {
        Term::prefix(content, None).unwrap()
    }

    #[test]
    fn plain_input() {
        let input = Input::new(vec![term("a"), term("b")], false, false).unwrap();
        assert_eq!(input.terms().len(), 2);
        assert!(!input.requires_left_boundary());
        assert!(!input.requires_right_boundary());
        assert!(!input.has_wildcard());
    }

    #[test]
    fn wildcard_must_be_last() {
        let err = Input::new(vec![prefix("a"), term("b")], false, false).unwrap_err();
        assert!(err.message().contains("last term"));
    }

    #[test]
    fn wildcard_as_last_is_accepted() {
        let input = Input::new(vec![term("a"), prefix("b")], true, false).unwrap();
        assert!(input.has_wildcard());
    }

    #[test]
    fn wildcard_with_right_boundary_rejected() {
        let err = Input::new(vec![prefix("a")], false, true).unwrap_err();
        assert_eq!(err.message(), "* cannot be combined with right boundary");
    }

    #[test]
    fn empty_anchored_input() {
        let input = Input::new(vec![], true, true).unwrap();
        assert!(input.terms().is_empty());
        assert!(input.requires_left_boundary());
        assert!(input.requires_right_boundary());
    }

    #[test]
    fn display_round_trips() {
        let input = Input::new(vec![term("a"), prefix("b")], true, false).unwrap();
        assert_eq!(input.to_string(), "\"a b*");
        let anchored = Input::new(vec![], true, true).unwrap();
        assert_eq!(anchored.to_string(), "\"\"");
    }
}
