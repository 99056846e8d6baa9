use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::apply::{self, RewriteAction};
use crate::compile;
use crate::parse::{TermParser, WhitespaceTermParser};
use crate::types::{CompileError, Input, Instructions, QueryToken};

/// Builder for a [`RuleIndex`]: inserts one `(Input, Instructions)` pair at
/// a time and compiles them into an immutable trie.
///
/// # Example
///
/// ```
/// use requery::{parse_input, Instruction, Instructions, RuleIndex, Term};
///
/// let index = RuleIndex::builder()
///     .insert(
///         parse_input("running shoe*").unwrap(),
///         Instructions::new(0, "shoes", vec![Instruction::Filter {
///             terms: vec![Term::new("sports", None).unwrap()],
///         }]),
///     )
///     .build()
///     .unwrap();
/// assert_eq!(index.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RuleIndexBuilder {
    entries: Vec<IndexedRule>,
}

#[derive(Debug)]
struct IndexedRule {
    input: Input,
    instructions: Instructions,
}

impl RuleIndexBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one trigger with its instructions. Distinct inputs may share an
    /// instructions id (one logical rule with alternative triggers).
    #[must_use]
    pub fn insert(mut self, input: Input, instructions: Instructions) -> Self {
        self.entries.push(IndexedRule {
            input,
            instructions,
        });
        self
    }

    /// Compile the inserted rules into an immutable `RuleIndex`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::DuplicateOrd`] if two rules share an ordinal.
    pub fn build(self) -> Result<RuleIndex, CompileError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            let ord = entry.instructions.ord();
            if !seen.insert(ord) {
                return Err(CompileError::DuplicateOrd { ord });
            }
        }

        let mut root = TrieNode::default();
        let mut anchored_empty = Vec::new();
        for (id, entry) in self.entries.iter().enumerate() {
            let terms = entry.input.terms();
            if terms.is_empty() {
                anchored_empty.push(id);
                continue;
            }
            let (exact, wildcard) = if entry.input.has_wildcard() {
                (&terms[..terms.len() - 1], terms.last())
            } else {
                (terms, None)
            };
            let mut node = &mut root;
            for term in exact {
                node = node.children.entry(term.content().to_owned()).or_default();
            }
            match wildcard {
                Some(term) => node.prefix_entries.push((term.content().to_owned(), id)),
                None => node.exact_entries.push(id),
            }
        }

        Ok(RuleIndex {
            root,
            anchored_empty,
            entries: self.entries,
        })
    }
}

/// Trie node keyed by exact term content. Entries terminating at a node are
/// either exact (the full term path matched) or prefix entries (the
/// remaining wildcard term must prefix-match the next token).
#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<String, TrieNode>,
    exact_entries: Vec<usize>,
    prefix_entries: Vec<(String, usize)>,
}

/// The compiled, immutable trigger index. Thread-safe and designed to live
/// behind `Arc`; a rule-set reload builds a fresh index and swaps the
/// `Arc`, so in-flight readers keep the index they started with.
#[derive(Debug, Default)]
pub struct RuleIndex {
    root: TrieNode,
    anchored_empty: Vec<usize>,
    entries: Vec<IndexedRule>,
}

/// One trigger match over a query: the fired instructions, the matched
/// token span, and the wildcard capture when the trigger ended in a prefix
/// wildcard.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerMatch<'a> {
    instructions: &'a Instructions,
    start: usize,
    len: usize,
    capture: Option<String>,
}

impl<'a> TriggerMatch<'a> {
    #[must_use]
    pub fn instructions(&self) -> &'a Instructions {
        self.instructions
    }

    /// Index of the first matched query token.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of matched query tokens (0 for the degenerate anchored
    /// empty-trigger match against an empty query).
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The text captured by the trigger's prefix wildcard, if any. May be
    /// empty when the token equals the literal prefix exactly.
    #[must_use]
    pub fn capture(&self) -> Option<&str> {
        self.capture.as_deref()
    }
}

impl RuleIndex {
    #[must_use]
    pub fn builder() -> RuleIndexBuilder {
        RuleIndexBuilder::new()
    }

    /// Compile rules text into an index using the default whitespace term
    /// parser, aborting on the first malformed line.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] with line context for the first bad line.
    pub fn from_rules(text: &str) -> Result<Self, CompileError> {
        Self::from_rules_with(text, &WhitespaceTermParser)
    }

    /// Compile rules text with a caller-supplied term parser for rewrite
    /// text.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] with line context for the first bad line.
    pub fn from_rules_with(
        text: &str,
        term_parser: &dyn TermParser,
    ) -> Result<Self, CompileError> {
        compile::compile(text, term_parser)
    }

    /// Compile rules text, skipping malformed blocks instead of aborting.
    /// Returns the index over the well-formed rules together with one
    /// diagnostic per offending line, so a single bad rule never takes
    /// down the rest of the rule set.
    #[must_use]
    pub fn from_rules_lossy(text: &str) -> (Self, Vec<CompileError>) {
        compile::compile_lossy(text, &WhitespaceTermParser)
    }

    /// The number of indexed rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find every rule whose trigger matches a contiguous run of query
    /// tokens.
    ///
    /// At each start position only the longest matching triggers survive,
    /// so a longer, more specific rule suppresses shorter rules sharing its
    /// prefix; equal-length survivors are ordered by `ord`. An unmatched
    /// query yields an empty vec.
    #[must_use]
    pub fn matches<'a>(&'a self, query: &[QueryToken]) -> Vec<TriggerMatch<'a>> {
        let mut raw: Vec<TriggerMatch<'a>> = Vec::new();

        if query.is_empty() {
            // The anchored empty trigger describes the whole query span;
            // with no tokens that is only the empty query.
            for &id in &self.anchored_empty {
                let entry = &self.entries[id];
                if entry.input.requires_left_boundary() && entry.input.requires_right_boundary() {
                    raw.push(TriggerMatch {
                        instructions: &entry.instructions,
                        start: 0,
                        len: 0,
                        capture: None,
                    });
                }
            }
            raw.sort_by_key(|m| m.instructions.ord());
            return raw;
        }

        for start in 0..query.len() {
            let mut node = &self.root;
            for (offset, token) in query[start..].iter().enumerate() {
                for (prefix, id) in &node.prefix_entries {
                    if let Some(capture) = token.content().strip_prefix(prefix.as_str()) {
                        if let Some(m) =
                            self.candidate(*id, start, offset + 1, Some(capture), query)
                        {
                            raw.push(m);
                        }
                    }
                }
                let Some(child) = node.children.get(token.content()) else {
                    break;
                };
                for &id in &child.exact_entries {
                    if let Some(m) = self.candidate(id, start, offset + 1, None, query) {
                        raw.push(m);
                    }
                }
                node = child;
            }
        }

        // Longest-trigger-first: suppress shorter matches at the same start.
        let mut max_by_start: BTreeMap<usize, usize> = BTreeMap::new();
        for m in &raw {
            let best = max_by_start.entry(m.start).or_insert(m.len);
            *best = (*best).max(m.len);
        }
        raw.retain(|m| m.len == max_by_start[&m.start]);
        raw.sort_by_key(|m| (m.start, m.instructions.ord()));
        raw
    }

    /// Match and apply in one step: the rewrite actions for a query.
    #[must_use]
    pub fn rewrite(&self, query: &[QueryToken]) -> Vec<RewriteAction> {
        apply::apply(&self.matches(query))
    }

    fn candidate<'a>(
        &'a self,
        id: usize,
        start: usize,
        len: usize,
        capture: Option<&str>,
        query: &[QueryToken],
    ) -> Option<TriggerMatch<'a>> {
        let entry = &self.entries[id];
        let input = &entry.input;
        if input.requires_left_boundary() && start != 0 {
            return None;
        }
        if input.requires_right_boundary() && start + len != query.len() {
            return None;
        }
        // Content was matched by the trie walk; fields still need checking.
        for (term, token) in input.terms().iter().zip(&query[start..start + len]) {
            if !term.admits_field(token.field()) {
                return None;
            }
        }
        Some(TriggerMatch {
            instructions: &entry.instructions,
            start,
            len,
            capture: capture.map(str::to_owned),
        })
    }
}

impl fmt::Display for RuleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleIndex({} rules)", self.entries.len())
    }
}
