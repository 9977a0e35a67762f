use std::sync::{Arc, RwLock};
use std::thread;

use circ_rules::{CompiledRuleSet, LocationHierarchyIndex, PolicyResolver};

fn main() {
    let locations = LocationHierarchyIndex::builder()
        .institution("nottingham")
        .campus("jubilee", "nottingham")
        .library("djanogly", "jubilee")
        .location("3rd-floor", "djanogly")
        .build()
        .expect("failed to build location hierarchy");
    let rules = CompiledRuleSet::from_text("fallback-policy: l no-loan\nm book: l three-week\n")
        .expect("failed to compile rules");

    let current = Arc::new(RwLock::new(PolicyResolver::new(rules, locations)));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let current = Arc::clone(&current);
            thread::spawn(move || {
                // Take a snapshot; a concurrent rule reload does not affect it.
                let resolver = current.read().expect("lock poisoned").clone();
                let result = resolver.loan_policy("book", "can-circulate", "staff", "3rd-floor");
                println!("Thread {i}: {result:?}");
            })
        })
        .collect();

    let updated = CompiledRuleSet::from_text("fallback-policy: l no-loan\nm book: l four-week\n")
        .expect("failed to compile rules");
    {
        let mut guard = current.write().expect("lock poisoned");
        *guard = guard.with_rules(updated);
    }

    for h in handles {
        h.join().unwrap();
    }

    let resolver = current.read().expect("lock poisoned").clone();
    println!(
        "After reload: {:?}",
        resolver.loan_policy("book", "can-circulate", "staff", "3rd-floor")
    );
}
