use nom::{
    bytes::complete::tag_no_case,
    character::complete::{char, multispace0, multispace1},
    combinator::opt,
    multi::separated_list1,
    sequence::terminated,
    IResult, Parser,
};

use super::ast::DeleteClause;
use super::common::ws;
use super::errors::{promote, CypherParsingError};
use super::expression;

/// `[DETACH] DELETE expr[, expr…]`
pub fn parse_delete_clause(
    input: &'_ str,
) -> IResult<&'_ str, DeleteClause<'_>, CypherParsingError<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, detach) = opt(terminated(tag_no_case("DETACH"), multispace1)).parse(input)?;
    let (input, _) = tag_no_case("DELETE").parse(input)?;

    let (input, expressions) = separated_list1(
        ws(char(',')),
        |i| expression::parse_expression(i).map_err(promote),
    )
    .parse(input)?;

    Ok((
        input,
        DeleteClause {
            expressions,
            detach: detach.is_some(),
        },
    ))
}
