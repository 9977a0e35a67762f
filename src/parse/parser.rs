use winnow::Parser;

use super::error::ParseError;
use super::grammar::{statement, Statement};
use crate::{Condition, Facet, PolicyKind, PolicyMap, RuleLine};

/// A `fallback-policy` assignment and the line declaring it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFallback {
    pub line: u32,
    pub kind: PolicyKind,
    pub policy_id: String,
}

/// The result of parsing rule text, before semantic validation.
#[derive(Debug, Default)]
pub struct ParsedRuleSet {
    pub fallbacks: Vec<ParsedFallback>,
    pub lines: Vec<RuleLine>,
}

/// Strip a trailing `#` or `//` comment.
fn strip_comment(raw: &str) -> &str {
    let end = [raw.find('#'), raw.find("//")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(raw.len());
    &raw[..end]
}

pub(super) fn parse_rules(input: &str) -> Result<ParsedRuleSet, ParseError> {
    let mut parsed = ParsedRuleSet::default();

    for (idx, raw) in input.lines().enumerate() {
        #[allow(clippy::cast_possible_truncation)] // rule text never nears 4G lines
        let line = (idx + 1) as u32;
        let text = strip_comment(raw);
        if text.trim().is_empty() {
            continue;
        }

        match parse_line(line, text)? {
            Statement::Fallback(assignments) => {
                let policies = collect_policies(line, text, assignments)?;
                parsed
                    .fallbacks
                    .extend(policies.iter().map(|(kind, id)| ParsedFallback {
                        line,
                        kind,
                        policy_id: id.to_owned(),
                    }));
            }
            Statement::Rule {
                conditions,
                assignments,
            } => {
                let conditions = collect_conditions(line, text, conditions)?;
                let policies = collect_policies(line, text, assignments)?;
                parsed.lines.push(RuleLine::new(line, conditions, policies));
            }
        }
    }

    Ok(parsed)
}

fn parse_line(line: u32, text: &str) -> Result<Statement, ParseError> {
    statement.parse(text).map_err(|e| {
        let message = e.inner().to_string().replace('\n', "; ");
        let message = if message.is_empty() {
            "invalid syntax".to_owned()
        } else {
            message
        };
        ParseError::new(line, token_at(text, e.offset()), message)
    })
}

/// The token starting at `offset`: a run of id characters, or a single
/// punctuation character.
fn token_at(text: &str, offset: usize) -> &str {
    let rest = text.get(offset..).unwrap_or("").trim_start();
    let is_word = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
    match rest.char_indices().find(|&(_, c)| !is_word(c)) {
        Some((0, c)) => &rest[..c.len_utf8()],
        Some((end, _)) => &rest[..end],
        None => rest,
    }
}

fn collect_conditions(
    line: u32,
    text: &str,
    conditions: Vec<(Facet, Condition)>,
) -> Result<[Condition; Facet::COUNT], ParseError> {
    let mut slots: [Condition; Facet::COUNT] = Default::default();
    for (facet, condition) in conditions {
        if !slots[facet.slot()].is_any() {
            return Err(ParseError::new(
                line,
                keyword_in(text, facet.keyword(), facet.letter()),
                format!("{facet} constrained more than once"),
            ));
        }
        slots[facet.slot()] = condition;
    }
    Ok(slots)
}

fn collect_policies(
    line: u32,
    text: &str,
    assignments: Vec<(PolicyKind, String)>,
) -> Result<PolicyMap, ParseError> {
    let mut policies = PolicyMap::new();
    for (kind, id) in assignments {
        if policies.insert(kind, id).is_some() {
            return Err(ParseError::new(
                line,
                keyword_in(text, kind.keyword(), kind.letter()),
                format!("{kind} policy assigned more than once"),
            ));
        }
    }
    Ok(policies)
}

/// Whichever spelling of a keyword the line actually used.
fn keyword_in(text: &str, long: &'static str, letter: char) -> String {
    if text.split(|c: char| c.is_whitespace() || c == ':').any(|w| w == long) {
        long.to_owned()
    } else {
        letter.to_string()
    }
}
