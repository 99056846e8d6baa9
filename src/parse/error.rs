use thiserror::Error;

use crate::types::InvalidTermError;

/// A line-level validation failure, returned as a normal value by the line
/// compiler. Callers branch on it explicitly; it never crosses the compiler
/// boundary as a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<InvalidTermError> for ValidationError {
    fn from(err: InvalidTermError) -> Self {
        Self::new(err.to_string())
    }
}
