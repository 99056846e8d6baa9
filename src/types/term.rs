use std::cmp::Ordering;
use std::fmt;

use super::error::InvalidTermError;
use super::token::QueryToken;

/// A single matchable unit of a trigger: a span of characters, optionally
/// restricted to a set of field names, optionally marked as a prefix
/// wildcard.
///
/// Field names are stored sorted and deduplicated, so two terms with the
/// same fields in different order compare equal and serialization is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    content: String,
    field_names: Option<Vec<String>>,
    prefix: bool,
}

impl Term {
    /// Create a non-wildcard term.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTermError`] if `content` is empty.
    pub fn new(
        content: impl Into<String>,
        field_names: Option<Vec<String>>,
    ) -> Result<Self, InvalidTermError> {
        Self::build(content.into(), field_names, false)
    }

    /// Create a prefix-wildcard term. `content` is the literal prefix that
    /// a query token must start with.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTermError`] if `content` is empty (a bare wildcard
    /// has no matchable prefix).
    pub fn prefix(
        content: impl Into<String>,
        field_names: Option<Vec<String>>,
    ) -> Result<Self, InvalidTermError> {
        Self::build(content.into(), field_names, true)
    }

    fn build(
        content: String,
        field_names: Option<Vec<String>>,
        prefix: bool,
    ) -> Result<Self, InvalidTermError> {
        if content.is_empty() {
            let reason = if prefix {
                "wildcard-only term not allowed"
            } else {
                "term content must not be empty"
            };
            return Err(InvalidTermError::new(content, reason));
        }
        let field_names = field_names.filter(|f| !f.is_empty()).map(|mut f| {
            f.sort();
            f.dedup();
            f
        });
        Ok(Self {
            content,
            field_names,
            prefix,
        })
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The number of characters in the term content (the literal prefix for
    /// wildcard terms).
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Random access by character position.
    #[must_use]
    pub fn char_at(&self, i: usize) -> Option<char> {
        self.content.chars().nth(i)
    }

    /// The field restriction set, or `None` for an unrestricted term.
    /// When present, the slice is sorted and non-empty.
    #[must_use]
    pub fn field_names(&self) -> Option<&[String]> {
        self.field_names.as_deref()
    }

    #[must_use]
    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    /// Whether a token with the given field tag is admissible: an
    /// unrestricted term admits any field, a restricted term only tokens
    /// tagged with one of its fields.
    #[must_use]
    pub fn admits_field(&self, field: Option<&str>) -> bool {
        match &self.field_names {
            None => true,
            Some(names) => field.is_some_and(|f| names.iter().any(|n| n == f)),
        }
    }

    /// Whether this term matches a query token: content equality (prefix
    /// match for wildcard terms) plus field admission.
    #[must_use]
    pub fn matches(&self, token: &QueryToken) -> bool {
        let content_ok = if self.prefix {
            token.content().starts_with(self.content.as_str())
        } else {
            token.content() == self.content
        };
        content_ok && self.admits_field(token.field())
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.content
            .cmp(&other.content)
            .then_with(|| self.field_names.cmp(&other.field_names))
            .then_with(|| self.prefix.cmp(&other.prefix))
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field_names.as_deref() {
            Some([single]) => write!(f, "{single}:")?,
            Some(names) => write!(f, "{{{}}}:", names.join(","))?,
            None => {}
        }
        write!(f, "{}", self.content)?;
        if self.prefix {
            write!(f, "*")?;
        }
        Ok(())
    }
}
