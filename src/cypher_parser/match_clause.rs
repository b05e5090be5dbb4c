use nom::{
    bytes::complete::tag_no_case,
    character::complete::{char, multispace0, multispace1},
    combinator::opt,
    multi::separated_list1,
    sequence::terminated,
    IResult, Parser,
};

use super::ast::MatchClause;
use super::common::ws;
use super::errors::{promote, CypherParsingError};
use super::{path_pattern, where_clause};

/// `[OPTIONAL] MATCH pattern[, pattern…] [WHERE predicate]`
pub fn parse_match_clause(
    input: &'_ str,
) -> IResult<&'_ str, MatchClause<'_>, CypherParsingError<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, optional) =
        opt(terminated(tag_no_case("OPTIONAL"), multispace1)).parse(input)?;
    let (input, _) = tag_no_case("MATCH").parse(input)?;

    let (input, patterns) = separated_list1(
        ws(char(',')),
        |i| path_pattern::parse_pattern(i).map_err(promote),
    )
    .parse(input)?;

    let (input, where_expr) = opt(where_clause::parse_where_clause).parse(input)?;

    Ok((
        input,
        MatchClause {
            patterns,
            where_clause: where_expr,
            optional: optional.is_some(),
        },
    ))
}
