use std::collections::HashSet;

use crate::index::TriggerMatch;
use crate::types::{contains_placeholder, BoostDirection, Instruction, Term, PLACEHOLDER};

/// A rewrite action produced by applying matched rules to a query: the
/// instruction with its placeholder references resolved against the match
/// captures.
#[derive(Debug, Clone, PartialEq)]
pub enum RewriteAction {
    Boost {
        direction: BoostDirection,
        weight: Option<f64>,
        terms: Vec<Term>,
    },
    Filter {
        terms: Vec<Term>,
    },
    Delete {
        terms: Vec<Term>,
    },
    Decorate {
        key: Option<String>,
        value: String,
    },
}

/// Resolve trigger matches into the final action list.
///
/// Matches are processed in ascending `ord` order. When several matches
/// carry the same instructions id (a rule with alternative triggers fired
/// more than once), only the first is applied. `$1` in boost and filter
/// rewrite text is replaced by the match's wildcard capture; a term left
/// empty by the substitution is dropped.
#[must_use]
pub fn apply(matches: &[TriggerMatch<'_>]) -> Vec<RewriteAction> {
    let mut ordered: Vec<&TriggerMatch<'_>> = matches.iter().collect();
    ordered.sort_by_key(|m| m.instructions().ord());

    let mut seen = HashSet::new();
    let mut actions = Vec::new();
    for m in ordered {
        if !seen.insert(m.instructions().id()) {
            continue;
        }
        for instruction in m.instructions() {
            actions.push(resolve(instruction, m.capture()));
        }
    }
    actions
}

fn resolve(instruction: &Instruction, capture: Option<&str>) -> RewriteAction {
    match instruction {
        Instruction::Boost {
            direction,
            weight,
            query,
            ..
        } => RewriteAction::Boost {
            direction: *direction,
            weight: *weight,
            terms: substitute_terms(query, capture),
        },
        Instruction::Filter { terms } => RewriteAction::Filter {
            terms: substitute_terms(terms, capture),
        },
        Instruction::Delete { terms } => RewriteAction::Delete {
            terms: terms.clone(),
        },
        Instruction::Decorate { key, value } => RewriteAction::Decorate {
            key: key.clone(),
            value: value.clone(),
        },
    }
}

fn substitute_terms(terms: &[Term], capture: Option<&str>) -> Vec<Term> {
    let Some(capture) = capture else {
        return terms.to_vec();
    };
    terms
        .iter()
        .filter_map(|term| {
            if !contains_placeholder(term.content()) {
                return Some(term.clone());
            }
            let content = substitute(term.content(), capture);
            let fields = term.field_names().map(<[String]>::to_vec);
            // An empty capture can hollow the term out entirely; drop it.
            Term::new(content, fields).ok()
        })
        .collect()
}

fn substitute(content: &str, capture: &str) -> String {
    let mut out = String::with_capacity(content.len() + capture.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == PLACEHOLDER && chars.peek() == Some(&'1') {
            chars.next();
            out.push_str(capture);
        } else {
            out.push(c);
        }
    }
    out
}
