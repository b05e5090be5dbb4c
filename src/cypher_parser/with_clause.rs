use nom::{bytes::complete::tag_no_case, combinator::opt, IResult, Parser};

use super::ast::WithClause;
use super::common::ws;
use super::errors::CypherParsingError;
use super::return_clause::{parse_limit, parse_order_by, parse_projection_list, parse_skip};
use super::where_clause;

/// `WITH [DISTINCT] items [ORDER BY …] [SKIP n] [LIMIT n] [WHERE predicate]`
///
/// The trailing WHERE filters the projected intermediate result; the
/// generator lowers it to HAVING on the CTE.
pub fn parse_with_clause(
    input: &'_ str,
) -> IResult<&'_ str, WithClause<'_>, CypherParsingError<'_>> {
    let (input, _) = ws(tag_no_case("WITH")).parse(input)?;
    let (input, distinct) = opt(ws(tag_no_case("DISTINCT"))).parse(input)?;

    let (input, items) = parse_projection_list(input)?;
    let (input, order_by) = opt(parse_order_by).parse(input)?;
    let (input, skip) = opt(parse_skip).parse(input)?;
    let (input, limit) = opt(parse_limit).parse(input)?;
    let (input, where_expr) = opt(where_clause::parse_where_clause).parse(input)?;

    Ok((
        input,
        WithClause {
            items,
            distinct: distinct.is_some(),
            order_by,
            skip,
            limit,
            where_clause: where_expr,
        },
    ))
}
