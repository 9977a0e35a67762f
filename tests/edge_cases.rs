use circ_rules::{
    CompiledRuleSet, Condition, Error, Facet, HierarchyError, LocationHierarchyIndex, MatchError,
    PolicyKind, Query, RuleSetBuilder,
};

fn locations() -> LocationHierarchyIndex {
    LocationHierarchyIndex::builder()
        .institution("nottingham")
        .campus("jubilee", "nottingham")
        .library("djanogly", "jubilee")
        .location("3rd-floor", "djanogly")
        .build()
        .unwrap()
}

fn loan(item: &'static str) -> Query<'static> {
    Query::new(PolicyKind::Loan, item, "can-circulate", "staff", "3rd-floor")
}

#[test]
fn empty_rule_text_compiles_but_cannot_resolve() {
    let rules = CompiledRuleSet::from_text("").unwrap();
    assert!(rules.is_empty());
    assert_eq!(
        rules.resolve_one(&locations(), &loan("book")),
        Err(MatchError::UnknownPolicyKind {
            kind: PolicyKind::Loan
        })
    );
}

#[test]
fn only_comments_and_blank_lines() {
    let rules = CompiledRuleSet::from_text("\n   \n# nothing\n// here\n\t\n").unwrap();
    assert!(rules.is_empty());
}

#[test]
fn fallback_only_rule_set() {
    let rules = CompiledRuleSet::from_text("fallback-policy: l D").unwrap();
    let best = rules.resolve_one(&locations(), &loan("book")).unwrap();
    assert!(best.is_fallback());
    assert_eq!(best.policy_id(), "D");
    assert_eq!(best.line(), 0);

    let all = rules.resolve_all(&locations(), &loan("book")).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all.best(), Some(&best));
}

#[test]
fn fallback_declared_after_rules() {
    let text = "\
m book: l L1
fallback-policy: l D
";
    let rules = CompiledRuleSet::from_text(text).unwrap();
    assert_eq!(rules.lines()[0].line(), 1);
    assert_eq!(rules.resolve_one(&locations(), &loan("dvd")).unwrap().policy_id(), "D");
}

#[test]
fn kind_checked_before_location() {
    let rules = CompiledRuleSet::from_text("fallback-policy: l D").unwrap();
    let query = Query::new(PolicyKind::Request, "book", "x", "staff", "nowhere");
    assert_eq!(
        rules.resolve_one(&locations(), &query),
        Err(MatchError::UnknownPolicyKind {
            kind: PolicyKind::Request
        })
    );
}

#[test]
fn unknown_location_even_when_no_line_mentions_location() {
    let rules = CompiledRuleSet::from_text("fallback-policy: l D\nall: l L").unwrap();
    let query = Query::new(PolicyKind::Loan, "book", "x", "staff", "nowhere");
    assert!(matches!(
        rules.resolve_all(&locations(), &query),
        Err(MatchError::UnknownLocation { .. })
    ));
}

#[test]
fn empty_query_values_are_ordinary_ids() {
    let rules = CompiledRuleSet::from_text("fallback-policy: l D\nt !reference: l L").unwrap();
    let query = Query::new(PolicyKind::Loan, "", "", "", "3rd-floor");
    assert_eq!(rules.resolve_one(&locations(), &query).unwrap().policy_id(), "L");
}

#[test]
fn ids_are_case_sensitive() {
    let rules = CompiledRuleSet::from_text("fallback-policy: l D\nm Book: l L").unwrap();
    assert_eq!(rules.resolve_one(&locations(), &loan("book")).unwrap().policy_id(), "D");
    assert_eq!(rules.resolve_one(&locations(), &loan("Book")).unwrap().policy_id(), "L");
}

#[test]
fn negated_set_with_several_ids() {
    let rules =
        CompiledRuleSet::from_text("fallback-policy: l D\nm !book dvd, laptop: l L").unwrap();
    assert_eq!(
        rules.lines()[0].condition(Facet::ItemType),
        &Condition::not_in(["book", "dvd", "laptop"])
    );
    assert_eq!(rules.resolve_one(&locations(), &loan("dvd")).unwrap().policy_id(), "D");
    assert_eq!(rules.resolve_one(&locations(), &loan("map")).unwrap().policy_id(), "L");
}

#[test]
fn negation_counts_toward_specificity() {
    let text = "\
fallback-policy: l D
m !dvd: l NEG
g staff: l POS
";
    let rules = CompiledRuleSet::from_text(text).unwrap();
    assert_eq!(rules.lines()[0].specificity(), 1);
    // Same specificity, later line wins.
    assert_eq!(rules.resolve_one(&locations(), &loan("book")).unwrap().policy_id(), "POS");
}

#[test]
fn maximum_specificity_line() {
    let text = "\
fallback-policy: l D
m book + t can-circulate + g staff + a nottingham + b jubilee + c djanogly + s 3rd-floor: l ALL7
";
    let rules = CompiledRuleSet::from_text(text).unwrap();
    assert_eq!(rules.lines()[0].specificity(), 7);
    let best = rules.resolve_one(&locations(), &loan("book")).unwrap();
    assert_eq!((best.policy_id(), best.specificity()), ("ALL7", 7));
}

#[test]
fn location_rank_uses_deepest_constrained_level() {
    let rules = RuleSetBuilder::new()
        .fallback(PolicyKind::Loan, "D")
        .line(|l| {
            l.when(Facet::Institution, Condition::is_in(["nottingham"]))
                .when(Facet::Library, Condition::is_in(["djanogly"]))
                .assign(PolicyKind::Loan, "L")
        })
        .compile()
        .unwrap();
    assert_eq!(rules.lines()[0].specificity(), 3);
}

#[test]
fn many_lines_keep_ranking() {
    let mut text = String::from("fallback-policy: l D\n");
    for i in 0..200 {
        text.push_str(&format!("g staff: l P{i}\n"));
    }
    text.push_str("m book + g staff: l BEST\n");
    let rules = CompiledRuleSet::from_text(&text).unwrap();
    assert_eq!(rules.len(), 201);

    let all = rules.resolve_all(&locations(), &loan("book")).unwrap();
    assert_eq!(all.len(), 202);
    assert_eq!(all[0].policy_id(), "BEST");
    assert_eq!(all[1].policy_id(), "P199");
    assert_eq!(all[200].policy_id(), "P0");
    assert!(all[201].is_fallback());
}

#[test]
fn windows_line_endings() {
    let rules = CompiledRuleSet::from_text("fallback-policy: l D\r\nm book: l L\r\n").unwrap();
    assert_eq!(rules.resolve_one(&locations(), &loan("book")).unwrap().line(), 2);
}

#[test]
fn hierarchy_errors_surface_through_crate_error() {
    let err: Error = LocationHierarchyIndex::builder()
        .location("annex", "nowhere")
        .build()
        .unwrap_err()
        .into();
    assert!(matches!(
        err,
        Error::Hierarchy(HierarchyError::UnknownParent { .. })
    ));
    assert_eq!(
        err.to_string(),
        "location 'annex' references unknown parent 'nowhere'"
    );
}

#[test]
fn display_forms() {
    let rules = CompiledRuleSet::from_text("fallback-policy: l D\nm book + t !reference: l L").unwrap();
    assert_eq!(rules.lines()[0].to_string(), "2: m book + t !reference => l L");
    assert_eq!(rules.to_string(), "CompiledRuleSet(1 lines, fallback: l D)");

    let all = rules.resolve_all(&locations(), &loan("book")).unwrap();
    assert_eq!(all.to_string(), "1. L (line 2, specificity 2)\n2. D (fallback)");
}
