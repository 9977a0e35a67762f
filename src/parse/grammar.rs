use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::{Condition, Facet, PolicyKind};

pub(super) const FALLBACK_KEYWORD: &str = "fallback-policy";

/// One non-blank, comment-free line of rule text.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Statement {
    Fallback(Vec<(PolicyKind, String)>),
    Rule {
        conditions: Vec<(Facet, Condition)>,
        assignments: Vec<(PolicyKind, String)>,
    },
}

// -- Whitespace ---------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., [' ', '\t']).void().parse_next(input)
}

// -- Words and ids ------------------------------------------------------------

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn word<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., is_id_char).parse_next(input)
}

fn id(input: &mut &str) -> ModalResult<String> {
    ws.parse_next(input)?;
    word.map(str::to_owned)
        .context(StrContext::Expected(StrContextValue::Description("id")))
        .parse_next(input)
}

/// Ids separated by commas and/or whitespace.
fn id_list(input: &mut &str) -> ModalResult<Vec<String>> {
    let first = id(input)?;
    let rest: Vec<String> = repeat(0.., preceded((ws, opt(',')), id)).parse_next(input)?;
    Ok(std::iter::once(first).chain(rest).collect())
}

// -- Conditions ---------------------------------------------------------------

fn facet(input: &mut &str) -> ModalResult<Facet> {
    ws.parse_next(input)?;
    word.verify_map(Facet::from_keyword)
        .context(StrContext::Label("facet keyword"))
        .parse_next(input)
}

fn condition_body(input: &mut &str) -> ModalResult<Condition> {
    ws.parse_next(input)?;
    alt((
        preceded('!', cut_err(id_list)).map(Condition::not_in),
        delimited(("not", ws, '('), cut_err(id_list), (ws, cut_err(')'))).map(Condition::not_in),
        id_list.map(Condition::is_in),
    ))
    .context(StrContext::Expected(StrContextValue::Description("id list")))
    .parse_next(input)
}

fn condition(input: &mut &str) -> ModalResult<(Facet, Condition)> {
    let facet = facet(input)?;
    let condition = cut_err(condition_body).parse_next(input)?;
    Ok((facet, condition))
}

fn conditions(input: &mut &str) -> ModalResult<Vec<(Facet, Condition)>> {
    ws.parse_next(input)?;
    let checkpoint = input.checkpoint();
    if word.parse_next(input).ok() == Some("all") {
        return Ok(Vec::new());
    }
    input.reset(&checkpoint);

    let first = condition(input)?;
    let rest: Vec<(Facet, Condition)> =
        repeat(0.., preceded((ws, '+'), cut_err(condition))).parse_next(input)?;
    Ok(std::iter::once(first).chain(rest).collect())
}

// -- Policy assignments -------------------------------------------------------

fn policy_kind(input: &mut &str) -> ModalResult<PolicyKind> {
    ws.parse_next(input)?;
    word.verify_map(PolicyKind::from_keyword)
        .context(StrContext::Label("policy kind"))
        .parse_next(input)
}

fn assignment(input: &mut &str) -> ModalResult<(PolicyKind, String)> {
    let kind = policy_kind(input)?;
    let policy_id = cut_err(id).parse_next(input)?;
    Ok((kind, policy_id))
}

fn assignments(input: &mut &str) -> ModalResult<Vec<(PolicyKind, String)>> {
    let first = assignment(input)?;
    let rest: Vec<(PolicyKind, String)> = repeat(0.., assignment).parse_next(input)?;
    Ok(std::iter::once(first).chain(rest).collect())
}

// -- Statements ---------------------------------------------------------------

fn end_of_line(input: &mut &str) -> ModalResult<()> {
    ws.parse_next(input)?;
    winnow::combinator::eof
        .void()
        .context(StrContext::Expected(StrContextValue::Description(
            "end of line",
        )))
        .parse_next(input)
}

fn colon(input: &mut &str) -> ModalResult<()> {
    ws.parse_next(input)?;
    ':'.void()
        .context(StrContext::Expected(StrContextValue::CharLiteral(':')))
        .parse_next(input)
}

pub(super) fn statement(input: &mut &str) -> ModalResult<Statement> {
    ws.parse_next(input)?;

    let statement = if opt(FALLBACK_KEYWORD).parse_next(input)?.is_some() {
        cut_err(colon).parse_next(input)?;
        Statement::Fallback(cut_err(assignments).parse_next(input)?)
    } else {
        let conditions = cut_err(conditions).parse_next(input)?;
        cut_err(colon).parse_next(input)?;
        let assignments = cut_err(assignments).parse_next(input)?;
        Statement::Rule {
            conditions,
            assignments,
        }
    };

    cut_err(end_of_line).parse_next(input)?;
    Ok(statement)
}
