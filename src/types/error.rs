use thiserror::Error;

/// Token-level error: a single term token that cannot form a valid
/// [`Term`](super::Term).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid term '{token}': {reason}")]
pub struct InvalidTermError {
    token: String,
    reason: String,
}

impl InvalidTermError {
    pub(crate) fn new(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// The offending token text.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub(crate) fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }
}

/// Errors produced while compiling a full rules text into an index.
/// Each variant carries enough context (line number, line content) for a
/// rule author to fix the offending line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("line {line}: {message}: '{content}'")]
    InvalidLine {
        line: usize,
        content: String,
        message: String,
    },

    #[error("line {line}: instruction without a preceding trigger: '{content}'")]
    MissingTrigger { line: usize, content: String },

    #[error("line {line}: trigger '{trigger}' has no instructions")]
    EmptyRule { line: usize, trigger: String },

    #[error("duplicate rule ordinal {ord}")]
    DuplicateOrd { ord: usize },
}
