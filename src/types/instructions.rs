use std::collections::BTreeMap;
use std::fmt;
use std::slice;

use super::instruction::Instruction;

/// All rewrite actions fired together by one trigger match, sharing one
/// identity and ordinal.
///
/// `id` links alternative triggers that express the same logical rule;
/// deduplication by id happens at match-result aggregation, not at index
/// build time. `ord` reflects definition order in the rule source and
/// breaks ties deterministically when several rules match.
#[derive(Debug, Clone, PartialEq)]
pub struct Instructions {
    id: String,
    ord: usize,
    items: Vec<Instruction>,
    properties: Properties,
}

impl Instructions {
    /// Reserved property key carrying the rule identity.
    pub const ID_PROPERTY: &'static str = "_id";
    /// Reserved property key carrying the optional log/trace message.
    pub const LOG_PROPERTY: &'static str = "_log";

    /// Create a new collection.
    ///
    /// # Panics
    ///
    /// Panics if `id` is empty. A missing identity is a defect in the
    /// compiler producing the collection, not a recoverable condition.
    pub fn new(ord: usize, id: impl Into<String>, items: Vec<Instruction>) -> Self {
        let id = id.into();
        assert!(!id.is_empty(), "instructions id must not be empty");
        Self {
            id,
            ord,
            items,
            properties: Properties::default(),
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn ord(&self) -> usize {
        self.ord
    }

    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Look up a property, resolving the reserved `_id` and `_log` keys
    /// before the extension map.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        match name {
            Self::ID_PROPERTY => Some(&self.id),
            Self::LOG_PROPERTY => self.properties.log(),
            other => self.properties.get(other),
        }
    }

    pub fn iter(&self) -> slice::Iter<'_, Instruction> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Instructions {
    type Item = &'a Instruction;
    type IntoIter = slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Instructions(id={}, ord={}, {} instruction(s))",
            self.id,
            self.ord,
            self.items.len()
        )
    }
}

/// Properties shared by all instructions of one rule: a fixed record (the
/// optional log message) plus a typed extension map for custom keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    log: Option<String>,
    extra: BTreeMap<String, String>,
}

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_log(mut self, message: impl Into<String>) -> Self {
        self.log = Some(message.into());
        self
    }

    /// Set a property. The reserved `_log` key routes to the fixed record.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key == Instructions::LOG_PROPERTY {
            self.log = Some(value.into());
        } else {
            self.extra.insert(key, value.into());
        }
    }

    #[must_use]
    pub fn log(&self) -> Option<&str> {
        self.log.as_deref()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.is_none() && self.extra.is_empty()
    }
}
