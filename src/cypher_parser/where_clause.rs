use nom::{bytes::complete::tag_no_case, IResult, Parser};

use super::ast::Expression;
use super::common::ws;
use super::errors::{promote, CypherParsingError};
use super::expression::parse_expression;

/// `WHERE <predicate>` — returns the bare predicate expression; the owning
/// clause decides where it lands (WHERE accumulator or HAVING).
pub fn parse_where_clause(
    input: &'_ str,
) -> IResult<&'_ str, Expression<'_>, CypherParsingError<'_>> {
    let (input, _) = ws(tag_no_case("WHERE")).parse(input)?;
    let (input, expression) = parse_expression(input).map_err(promote)?;
    Ok((input, expression))
}
