use circ_rules::{CompiledRuleSet, LocationHierarchyIndex, PolicyKind, Query};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    // RUST_LOG=circ_rules=trace shows every resolution.
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("circ_rules=debug")))
        .init();

    let rules =
        CompiledRuleSet::from_file("demos/nottingham.rules").expect("failed to load rules");
    let locations = LocationHierarchyIndex::builder()
        .institution("nottingham")
        .campus("jubilee", "nottingham")
        .library("djanogly", "jubilee")
        .library("business", "jubilee")
        .location("3rd-floor", "djanogly")
        .location("2nd-floor-economics", "business")
        .build()
        .expect("failed to build location hierarchy");

    for line in rules.lines() {
        println!("{line}");
    }
    println!();

    // Why does a postgrad get this loan policy for a book in the business library?
    let query = Query::new(
        PolicyKind::Loan,
        "book",
        "can-circulate",
        "postgrad",
        "2nd-floor-economics",
    );
    let all = rules
        .resolve_all(&locations, &query)
        .expect("query should resolve");

    println!("{query}");
    println!("{all}");
    if let Some(best) = all.best() {
        if let Some(line) = rules.line(best.line()) {
            println!("\nwinning line: {line}");
        }
    }

    for kind in PolicyKind::ALL {
        let q = query.with_kind(kind);
        match rules.resolve_one(&locations, &q) {
            Ok(m) => println!("{kind}: {m}"),
            Err(e) => println!("{kind}: {e}"),
        }
    }
}
