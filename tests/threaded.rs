use std::sync::{Arc, RwLock};
use std::thread;

use circ_rules::{CompiledRuleSet, LocationHierarchyIndex, PolicyResolver};

const RULES: &str = "\
fallback-policy: l no-loan r no-hold n basic-notice
m book: l three-week
m book + g staff: l staff-book
a kopenhavn: n danish-notice
t !reference: r hold-ok
";

fn locations() -> LocationHierarchyIndex {
    LocationHierarchyIndex::builder()
        .institution("nottingham")
        .institution("kopenhavn")
        .campus("jubilee", "nottingham")
        .campus("city", "kopenhavn")
        .library("djanogly", "jubilee")
        .library("main", "city")
        .location("3rd-floor", "djanogly")
        .location("4th-floor", "main")
        .build()
        .unwrap()
}

#[test]
fn resolve_across_threads() {
    let resolver = PolicyResolver::new(CompiledRuleSet::from_text(RULES).unwrap(), locations());

    let mut handles = vec![];

    // Thread 1: staff borrowing a book -> staff-book
    let r = resolver.clone();
    handles.push(thread::spawn(move || {
        r.loan_policy("book", "can-circulate", "staff", "3rd-floor")
    }));

    // Thread 2: undergrad borrowing a book -> three-week
    let r = resolver.clone();
    handles.push(thread::spawn(move || {
        r.loan_policy("book", "can-circulate", "undergrad", "4th-floor")
    }));

    // Thread 3: notice in kopenhavn -> danish-notice
    let r = resolver.clone();
    handles.push(thread::spawn(move || {
        r.notice_policy("dvd", "can-circulate", "staff", "4th-floor")
    }));

    // Thread 4: request on a reference item -> no-hold
    let r = resolver.clone();
    handles.push(thread::spawn(move || {
        r.request_policy("book", "reference", "staff", "3rd-floor")
    }));

    let results: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    assert_eq!(results, ["staff-book", "three-week", "danish-notice", "no-hold"]);
}

#[test]
fn shared_snapshot_without_resolver() {
    let rules = Arc::new(CompiledRuleSet::from_text(RULES).unwrap());
    let locations = Arc::new(locations());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let rules = Arc::clone(&rules);
            let locations = Arc::clone(&locations);
            thread::spawn(move || {
                let patron = if i % 2 == 0 { "staff" } else { "visitor" };
                let matcher = rules.matcher(&locations);
                let query = circ_rules::Query::new(
                    circ_rules::PolicyKind::Loan,
                    "book",
                    "can-circulate",
                    patron,
                    "3rd-floor",
                );
                (i, matcher.best(&query).unwrap().into_policy_id())
            })
        })
        .collect();

    for handle in handles {
        let (i, policy) = handle.join().unwrap();
        let expected = if i % 2 == 0 { "staff-book" } else { "three-week" };
        assert_eq!(policy, expected);
    }
}

#[test]
fn atomic_swap_of_rule_snapshot() {
    let current = Arc::new(RwLock::new(PolicyResolver::new(
        CompiledRuleSet::from_text(RULES).unwrap(),
        locations(),
    )));

    // A reader takes its snapshot before the swap and keeps using it.
    let before = current.read().unwrap().clone();

    let writer = {
        let current = Arc::clone(&current);
        thread::spawn(move || {
            let updated =
                CompiledRuleSet::from_text("fallback-policy: l no-loan\nm book: l one-week\n")
                    .unwrap();
            let mut guard = current.write().unwrap();
            *guard = guard.with_rules(updated);
        })
    };
    writer.join().unwrap();

    let after = current.read().unwrap().clone();
    assert_eq!(
        before.loan_policy("book", "x", "undergrad", "3rd-floor").unwrap(),
        "three-week"
    );
    assert_eq!(
        after.loan_policy("book", "x", "undergrad", "3rd-floor").unwrap(),
        "one-week"
    );
    assert!(Arc::ptr_eq(before.locations(), after.locations()));
}
