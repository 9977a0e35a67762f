use circ_rules::{CompiledRuleSet, LocationHierarchyIndex, PolicyResolver};

fn main() {
    let rules = CompiledRuleSet::from_text(
        "\
fallback-policy: l no-loan r no-hold n basic-notice
m book: l three-week r hold-ok
m book + g staff: l term-loan
t reference: l in-library-use
",
    )
    .expect("failed to compile rules");

    println!("{rules}");

    let locations = LocationHierarchyIndex::builder()
        .institution("nottingham")
        .campus("jubilee", "nottingham")
        .library("djanogly", "jubilee")
        .location("3rd-floor", "djanogly")
        .build()
        .expect("failed to build location hierarchy");

    let resolver = PolicyResolver::new(rules, locations);

    for patron in ["staff", "undergrad"] {
        match resolver.loan_policy("book", "can-circulate", patron, "3rd-floor") {
            Ok(policy) => println!("{patron} borrowing a book: {policy}"),
            Err(e) => println!("{patron}: {e}"),
        }
    }
}
