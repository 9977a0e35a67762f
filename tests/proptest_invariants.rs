
use std::cmp::Reverse;

use circ_rules::{CompiledRuleSet, Match, PolicyKind};
use proptest::prelude::*;
use strategies::{arb_query, arb_ruleset, locations, GenQuery};

/// Reference resolution: scan every line, keep the matching ones, sort.
fn brute_force(rules: &CompiledRuleSet, q: &GenQuery) -> Vec<Match> {
    let locations = locations();
    let query = q.query();
    let ancestors = locations.ancestors_of(q.location).unwrap();
    let mut found: Vec<Match> = rules
        .lines()
        .iter()
        .filter(|line| line.matches(&query, ancestors))
        .filter_map(|line| {
            line.policy(q.kind)
                .map(|id| Match::new(id, line.line(), line.specificity()))
        })
        .collect();
    found.sort_by_key(|m| Reverse((m.specificity(), m.line())));
    found
}

// ---------------------------------------------------------------------------
// Invariant 1: Totality
//
// With a fallback for every kind and a known location, resolution never
// fails, and an empty match set yields the fallback on line 0.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn resolve_one_never_fails(gen in arb_ruleset(), q in arb_query()) {
        let rules = gen.compile();
        let locations = locations();
        let best = rules.resolve_one(&locations, &q.query());
        prop_assert!(best.is_ok(), "resolve_one failed: {best:?}");

        let best = best.unwrap();
        if best.is_fallback() {
            prop_assert_eq!(best.line(), 0);
            prop_assert_eq!(Some(best.policy_id()), rules.default_policy(q.kind));
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Ordering
//
// resolve_all is sorted by (specificity, line) descending and always ends
// with exactly one fallback entry.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn resolve_all_sorted(gen in arb_ruleset(), q in arb_query()) {
        let rules = gen.compile();
        let all = rules.resolve_all(&locations(), &q.query()).unwrap();

        let (last, lines) = all.split_last().unwrap();
        prop_assert!(last.is_fallback());
        prop_assert!(lines.iter().all(|m| !m.is_fallback()));
        for pair in lines.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                (a.specificity(), a.line()) > (b.specificity(), b.line()),
                "out of order: {a} before {b}"
            );
        }
    }

    #[test]
    fn specificity_in_range(gen in arb_ruleset()) {
        let rules = gen.compile();
        for line in rules.lines() {
            prop_assert!(line.specificity() <= 7, "line {line} scores {}", line.specificity());
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Agreement
//
// The best match is the head of the full list, and both agree with a linear
// scan over every line.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn best_is_head_of_all(gen in arb_ruleset(), q in arb_query()) {
        let rules = gen.compile();
        let locations = locations();
        let best = rules.resolve_one(&locations, &q.query()).unwrap();
        let all = rules.resolve_all(&locations, &q.query()).unwrap();
        prop_assert_eq!(all.best(), Some(&best));
    }

    #[test]
    fn matches_linear_scan(gen in arb_ruleset(), q in arb_query()) {
        let rules = gen.compile();
        let all = rules.resolve_all(&locations(), &q.query()).unwrap().into_vec();
        let expected = brute_force(&rules, &q);
        prop_assert_eq!(&all[..all.len() - 1], &expected[..]);
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: Determinism
//
// Repeated resolution, recompilation, and compiling the rendered rule text
// instead of using the builder all give identical results.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn repeated_resolution(gen in arb_ruleset(), q in arb_query()) {
        let rules = gen.compile();
        let locations = locations();
        let first = rules.resolve_all(&locations, &q.query()).unwrap();
        for _ in 0..5 {
            let again = rules.resolve_all(&locations, &q.query()).unwrap();
            prop_assert_eq!(&first, &again, "determinism violated on repeated resolution");
        }
    }

    #[test]
    fn recompile_is_stable(gen in arb_ruleset(), q in arb_query()) {
        let locations = locations();
        let a = gen.compile().resolve_all(&locations, &q.query()).unwrap();
        let b = gen.compile().resolve_all(&locations, &q.query()).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn text_matches_builder(gen in arb_ruleset()) {
        let text = gen.text();
        let from_text = CompiledRuleSet::from_text(&text);
        prop_assert!(from_text.is_ok(), "{text}\n=> {from_text:?}");
        let from_text = from_text.unwrap();
        let from_builder = gen.compile();
        prop_assert_eq!(from_text.lines(), from_builder.lines());
        for kind in PolicyKind::ALL {
            prop_assert_eq!(from_text.default_policy(kind), from_builder.default_policy(kind));
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 5: Kind independence
//
// Lines that do not assign the query's kind never appear in its results.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn only_lines_assigning_kind(gen in arb_ruleset(), q in arb_query()) {
        let rules = gen.compile();
        let all = rules.resolve_all(&locations(), &q.query()).unwrap();
        for m in all.iter().filter(|m| !m.is_fallback()) {
            let line = rules.line(m.line()).unwrap();
            prop_assert_eq!(line.policy(q.kind), Some(m.policy_id()));
        }
    }
}
