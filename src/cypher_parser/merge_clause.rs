use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    IResult, Parser,
};

use super::ast::MergeClause;
use super::common::ws;
use super::errors::{promote, CypherParsingError};
use super::{path_pattern, set_clause};

/// `MERGE pattern [ON MATCH SET …] [ON CREATE SET …]` — the two ON handlers
/// may appear in either order, at most once each.
pub fn parse_merge_clause(
    input: &'_ str,
) -> IResult<&'_ str, MergeClause<'_>, CypherParsingError<'_>> {
    let (input, _) = ws(tag_no_case("MERGE")).parse(input)?;
    let (input, pattern) = path_pattern::parse_pattern(input).map_err(promote)?;

    let mut on_match = None;
    let mut on_create = None;
    let mut remaining = input;

    loop {
        let probe: IResult<&str, (&str, &str), CypherParsingError> = (
            ws(tag_no_case("ON")),
            ws(alt((tag_no_case("MATCH"), tag_no_case("CREATE")))),
        )
            .parse(remaining);

        match probe {
            Ok((rest, (_, handler))) => {
                let (rest, _) = ws(tag_no_case("SET")).parse(rest)?;
                let (rest, items) = set_clause::parse_set_items(rest)?;
                if handler.eq_ignore_ascii_case("MATCH") {
                    on_match = Some(items);
                } else {
                    on_create = Some(items);
                }
                remaining = rest;
            }
            Err(nom::Err::Incomplete(needed)) => return Err(nom::Err::Incomplete(needed)),
            Err(_) => break,
        }
    }

    Ok((
        remaining,
        MergeClause {
            pattern,
            on_match,
            on_create,
        },
    ))
}
