use std::cmp::Reverse;

use crate::parse::ParsedRuleSet;
use crate::{CompileError, CompiledRuleSet, PolicyKind, PolicyMap, RuleLine};

pub(crate) fn compile(parsed: ParsedRuleSet) -> Result<CompiledRuleSet, CompileError> {
    let defaults = collect_defaults(&parsed)?;
    check_lines(&parsed.lines, &defaults)?;

    let ranked = PolicyKind::ALL.map(|kind| rank(&parsed.lines, kind));

    tracing::debug!(
        lines = parsed.lines.len(),
        fallback = %defaults,
        "compiled circulation rules"
    );

    Ok(CompiledRuleSet {
        lines: parsed.lines,
        defaults,
        ranked,
    })
}

fn collect_defaults(parsed: &ParsedRuleSet) -> Result<PolicyMap, CompileError> {
    let mut defaults = PolicyMap::new();
    for fallback in &parsed.fallbacks {
        if defaults.contains(fallback.kind) {
            return Err(CompileError::DuplicateDefault {
                kind: fallback.kind,
                line: fallback.line,
            });
        }
        defaults.insert(fallback.kind, fallback.policy_id.clone());
    }
    Ok(defaults)
}

pub(crate) fn check_lines(lines: &[RuleLine], defaults: &PolicyMap) -> Result<(), CompileError> {
    for line in lines {
        if line.policies.is_empty() {
            return Err(CompileError::NoAssignments { line: line.line });
        }
        if let Some(kind) = line.policies.kinds().find(|&k| !defaults.contains(k)) {
            return Err(CompileError::MissingDefaultPolicy {
                kind,
                line: line.line,
            });
        }
    }
    Ok(())
}

/// Indices of the lines assigning `kind`, most specific first, later lines
/// first among equals.
pub(crate) fn rank(lines: &[RuleLine], kind: PolicyKind) -> Vec<usize> {
    let mut indices: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.policies.contains(kind))
        .map(|(idx, _)| idx)
        .collect();
    indices.sort_by_key(|&idx| Reverse((lines[idx].specificity, lines[idx].line)));
    indices
}
