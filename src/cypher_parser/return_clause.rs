use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::char,
    combinator::{map, opt},
    multi::separated_list1,
    sequence::preceded,
    IResult, Parser,
};

use super::ast::{Expression, Projection, ReturnClause, SortItem, SortOrder};
use super::common::{self, ws};
use super::errors::{promote, CypherParsingError};
use super::expression;

/// `RETURN [DISTINCT] items [ORDER BY …] [SKIP n] [LIMIT n]`
pub fn parse_return_clause(
    input: &'_ str,
) -> IResult<&'_ str, ReturnClause<'_>, CypherParsingError<'_>> {
    let (input, _) = ws(tag_no_case("RETURN")).parse(input)?;
    let (input, distinct) = opt(ws(tag_no_case("DISTINCT"))).parse(input)?;

    let (input, items) = parse_projection_list(input)?;
    let (input, order_by) = opt(parse_order_by).parse(input)?;
    let (input, skip) = opt(parse_skip).parse(input)?;
    let (input, limit) = opt(parse_limit).parse(input)?;

    Ok((
        input,
        ReturnClause {
            items,
            distinct: distinct.is_some(),
            order_by,
            skip,
            limit,
        },
    ))
}

pub(super) fn parse_projection_list(
    input: &'_ str,
) -> IResult<&'_ str, Vec<Projection<'_>>, CypherParsingError<'_>> {
    separated_list1(ws(char(',')), |i| parse_projection(i).map_err(promote)).parse(input)
}

fn parse_projection(input: &'_ str) -> IResult<&'_ str, Projection<'_>> {
    // `RETURN *` projects everything; a star is not a normal expression.
    let star: IResult<&str, &str> = ws(tag("*")).parse(input);
    if let Ok((rest, _)) = star {
        return Ok((
            rest,
            Projection {
                expression: Expression::Variable("*"),
                alias: None,
            },
        ));
    }

    let (input, expr) = expression::parse_expression(input)?;
    let (input, alias) = opt(preceded(
        ws(tag_no_case("AS")),
        ws(common::parse_identifier),
    ))
    .parse(input)?;

    Ok((
        input,
        Projection {
            expression: expr,
            alias,
        },
    ))
}

pub(super) fn parse_order_by(
    input: &'_ str,
) -> IResult<&'_ str, Vec<SortItem<'_>>, CypherParsingError<'_>> {
    let (input, _) = ws(tag_no_case("ORDER")).parse(input)?;
    let (input, _) = ws(tag_no_case("BY")).parse(input)?;
    separated_list1(ws(char(',')), |i| parse_sort_item(i).map_err(promote)).parse(input)
}

fn parse_sort_item(input: &'_ str) -> IResult<&'_ str, SortItem<'_>> {
    let (input, expr) = expression::parse_expression(input)?;
    let (input, order) = opt(alt((
        map(ws(tag_no_case("DESC")), |_| SortOrder::Desc),
        map(ws(tag_no_case("ASC")), |_| SortOrder::Asc),
    )))
    .parse(input)?;

    Ok((
        input,
        SortItem {
            expression: expr,
            order: order.unwrap_or(SortOrder::Asc),
        },
    ))
}

pub(super) fn parse_skip(
    input: &'_ str,
) -> IResult<&'_ str, Expression<'_>, CypherParsingError<'_>> {
    let (input, _) = ws(tag_no_case("SKIP")).parse(input)?;
    expression::parse_expression(input).map_err(promote)
}

pub(super) fn parse_limit(
    input: &'_ str,
) -> IResult<&'_ str, Expression<'_>, CypherParsingError<'_>> {
    let (input, _) = ws(tag_no_case("LIMIT")).parse(input)?;
    expression::parse_expression(input).map_err(promote)
}
