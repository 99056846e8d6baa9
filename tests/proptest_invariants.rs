
use std::collections::HashMap;

use proptest::prelude::*;
use requery::RuleIndex;
use strategies::{arb_query, arb_ruleset};

// ---------------------------------------------------------------------------
// Invariant 1: Determinism
//
// The same rule set + query must always produce the same matches, both on
// repeated lookup and across recompilation.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn determinism_repeated_lookup(gen in arb_ruleset(), query in arb_query()) {
        let index = gen.compile();
        let first = index.matches(&query);
        for _ in 0..5 {
            let again = index.matches(&query);
            prop_assert_eq!(&first, &again, "determinism violated on repeated lookup");
        }
    }

    #[test]
    fn determinism_recompile(gen in arb_ruleset(), query in arb_query()) {
        let a = gen.compile().matches(&query).len();
        let b = gen.compile().matches(&query).len();
        prop_assert_eq!(a, b, "determinism violated across recompilation");
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Match geometry
//
// Every match describes a span inside the query, matches at one start all
// have the same (maximal) length, and the result is ordered by
// (start, ord).
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn matches_stay_in_bounds(gen in arb_ruleset(), query in arb_query()) {
        let index = gen.compile();
        for m in index.matches(&query) {
            prop_assert!(m.start() + m.len() <= query.len());
            if !query.is_empty() {
                prop_assert!(m.len() >= 1, "empty span in a non-empty query");
            }
        }
    }

    #[test]
    fn one_length_per_start(gen in arb_ruleset(), query in arb_query()) {
        let index = gen.compile();
        let mut len_at: HashMap<usize, usize> = HashMap::new();
        for m in index.matches(&query) {
            let seen = len_at.entry(m.start()).or_insert_with(|| m.len());
            prop_assert_eq!(
                *seen,
                m.len(),
                "two match lengths survived at start {}",
                m.start()
            );
        }
    }

    #[test]
    fn match_spans_satisfy_their_trigger(gen in arb_ruleset(), query in arb_query()) {
        let index = gen.compile();
        for m in index.matches(&query) {
            // Every generated rule's ord is its position in the rule set.
            let trigger = &gen.triggers[m.instructions().ord()];
            prop_assert_eq!(m.len(), trigger.words.len());
            let span = &query[m.start()..m.start() + m.len()];
            for (i, (word, token)) in trigger.words.iter().zip(span).enumerate() {
                let last = i + 1 == trigger.words.len();
                if last && trigger.wildcard {
                    prop_assert!(token.content().starts_with(word));
                } else {
                    prop_assert_eq!(token.content(), *word);
                }
            }
            if trigger.left_boundary {
                prop_assert_eq!(m.start(), 0);
            }
            if trigger.right_boundary {
                prop_assert_eq!(m.start() + m.len(), query.len());
            }
        }
    }

    #[test]
    fn matches_sorted_by_start_then_ord(gen in arb_ruleset(), query in arb_query()) {
        let index = gen.compile();
        let keys: Vec<(usize, usize)> = index
            .matches(&query)
            .iter()
            .map(|m| (m.start(), m.instructions().ord()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        prop_assert_eq!(keys, sorted);
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Application
//
// Rewrite actions follow rule definition order and each rule id is applied
// at most once, no matter how often its triggers fired.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn each_id_applied_at_most_once(gen in arb_ruleset(), query in arb_query()) {
        let index = gen.compile();
        // Every generated rule carries exactly one decorate instruction, so
        // the action count equals the number of distinct fired ids.
        let matches = index.matches(&query);
        let mut ids: Vec<&str> = matches.iter().map(|m| m.instructions().id()).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(index.rewrite(&query).len(), ids.len());
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: Compilation modes agree
//
// When strict compilation succeeds, lossy compilation of the same text
// reports no diagnostics and indexes the same rules.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn lossy_agrees_with_strict_on_valid_input(gen in arb_ruleset()) {
        let text = gen.render();
        let strict = RuleIndex::from_rules(&text).expect("generated rules should compile");
        let (lossy, errors) = RuleIndex::from_rules_lossy(&text);
        prop_assert!(errors.is_empty(), "lossy reported errors on valid input: {errors:?}");
        prop_assert_eq!(strict.len(), lossy.len());
    }
}
