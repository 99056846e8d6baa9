/// One token of the incoming tokenized query: its content and the field it
/// was found in, if the upstream tokenizer assigned one.
///
/// Tokenization itself is the caller's responsibility; a malformed token is
/// rejected there and never reaches the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryToken {
    content: String,
    field: Option<String>,
}

impl QueryToken {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            field: None,
        }
    }

    pub fn with_field(content: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            field: Some(field.into()),
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl From<&str> for QueryToken {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}
