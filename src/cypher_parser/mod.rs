//! Cypher-subset parser.
//!
//! Recursive-descent over `nom` combinators, one module per clause. The
//! entry point is [`parse_statement`], which consumes the whole input and
//! yields the [`ast::Query`] the SQL generator walks.

use nom::{
    bytes::complete::{tag, tag_no_case},
    character::complete::multispace0,
    combinator::opt,
    IResult, Parser,
};

use ast::{Clause, Query};
pub use common::strip_comments;
use common::ws;
use errors::CypherParsingError;

pub mod ast;
mod call_clause;
mod common;
mod create_clause;
mod delete_clause;
pub(crate) mod errors;
mod expression;
mod match_clause;
mod merge_clause;
mod path_pattern;
mod remove_clause;
mod return_clause;
mod set_clause;
mod where_clause;
mod with_clause;

pub use errors::CypherParsingError as ParseError;

/// Parse a complete statement: a query, optional UNION branches, and an
/// optional trailing semicolon. Fails unless the whole input is consumed.
pub fn parse_statement(input: &'_ str) -> Result<Query<'_>, CypherParsingError<'_>> {
    match parse_statement_inner(input) {
        Ok((remainder, query)) => {
            let trailing = remainder.trim_start();
            if !trailing.is_empty() {
                return Err(CypherParsingError::new(
                    trailing,
                    "unexpected tokens after query",
                ));
            }
            Ok(query)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
        Err(nom::Err::Incomplete(_)) => {
            Err(CypherParsingError::new(input, "incomplete input"))
        }
    }
}

fn parse_statement_inner(
    input: &'_ str,
) -> IResult<&'_ str, Query<'_>, CypherParsingError<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, mut query) = parse_single_query(input)?;

    // Zero or more UNION [ALL] branches.
    let mut unions = Vec::new();
    let mut union_all = false;
    let mut remaining = input;
    loop {
        let probe: IResult<&str, &str, CypherParsingError> =
            ws(tag_no_case("UNION")).parse(remaining);
        match probe {
            Ok((rest, _)) => {
                let (rest, all) = opt(ws(tag_no_case("ALL"))).parse(rest)?;
                if all.is_some() {
                    union_all = true;
                }
                let (rest, branch) = parse_single_query(rest)?;
                unions.push(branch);
                remaining = rest;
            }
            Err(nom::Err::Incomplete(needed)) => return Err(nom::Err::Incomplete(needed)),
            Err(_) => break,
        }
    }

    let (remaining, _) = opt(ws(tag(";"))).parse(remaining)?;

    query.unions = unions;
    query.union_all = union_all;
    Ok((remaining, query))
}

/// One query: a non-empty ordered clause list.
fn parse_single_query(input: &'_ str) -> IResult<&'_ str, Query<'_>, CypherParsingError<'_>> {
    let mut clauses = Vec::new();
    let mut remaining = input;

    loop {
        match parse_clause(remaining) {
            Ok((rest, clause)) => {
                clauses.push(clause);
                remaining = rest;
            }
            Err(nom::Err::Incomplete(needed)) => return Err(nom::Err::Incomplete(needed)),
            Err(nom::Err::Failure(e)) => return Err(nom::Err::Failure(e)),
            Err(nom::Err::Error(e)) => {
                if clauses.is_empty() {
                    return Err(nom::Err::Error(e));
                }
                break;
            }
        }
    }

    Ok((
        remaining,
        Query {
            clauses,
            unions: Vec::new(),
            union_all: false,
        },
    ))
}

/// Try one clause parser; succeed, propagate unrecoverable failures, and
/// fall through only on a recoverable miss (keyword not present).
macro_rules! try_clause {
    ($input:expr, $parser:path, $wrap:expr) => {
        match $parser($input) {
            Ok((rest, clause)) => return Ok((rest, $wrap(clause))),
            Err(nom::Err::Failure(e)) => return Err(nom::Err::Failure(e)),
            Err(nom::Err::Incomplete(needed)) => return Err(nom::Err::Incomplete(needed)),
            Err(nom::Err::Error(_)) => {}
        }
    };
}

fn parse_clause(input: &'_ str) -> IResult<&'_ str, Clause<'_>, CypherParsingError<'_>> {
    let (input, _) = multispace0.parse(input)?;

    // Dispatch on the leading keyword. OPTIONAL MATCH and DETACH DELETE are
    // handled inside their own clause parsers.
    try_clause!(input, match_clause::parse_match_clause, Clause::Match);
    try_clause!(input, create_clause::parse_create_clause, Clause::Create);
    try_clause!(input, merge_clause::parse_merge_clause, Clause::Merge);
    try_clause!(input, with_clause::parse_with_clause, Clause::With);
    try_clause!(input, return_clause::parse_return_clause, Clause::Return);
    try_clause!(input, delete_clause::parse_delete_clause, Clause::Delete);
    try_clause!(input, set_clause::parse_set_clause, Clause::Set);
    try_clause!(input, remove_clause::parse_remove_clause, Clause::Remove);
    try_clause!(input, call_clause::parse_call_clause, Clause::Call);

    Err(nom::Err::Error(CypherParsingError::new(
        input,
        "expected a clause keyword (MATCH, CREATE, MERGE, WITH, RETURN, DELETE, SET, REMOVE, CALL)",
    )))
}
