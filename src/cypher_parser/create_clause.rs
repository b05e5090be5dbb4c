use nom::{
    bytes::complete::tag_no_case, character::complete::char, multi::separated_list1, IResult,
    Parser,
};

use super::ast::CreateClause;
use super::common::ws;
use super::errors::{promote, CypherParsingError};
use super::path_pattern;

/// `CREATE pattern[, pattern…]`
pub fn parse_create_clause(
    input: &'_ str,
) -> IResult<&'_ str, CreateClause<'_>, CypherParsingError<'_>> {
    let (input, _) = ws(tag_no_case("CREATE")).parse(input)?;

    let (input, patterns) = separated_list1(
        ws(char(',')),
        |i| path_pattern::parse_pattern(i).map_err(promote),
    )
    .parse(input)?;

    Ok((input, CreateClause { patterns }))
}
