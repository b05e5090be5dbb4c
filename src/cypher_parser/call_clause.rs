use nom::{
    bytes::complete::tag_no_case,
    character::complete::char,
    combinator::{opt, recognize},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

use super::ast::CallClause;
use super::common::{self, ws};
use super::errors::{promote, CypherParsingError};
use super::expression;

/// `CALL proc.name(args) [YIELD a, b]`
pub fn parse_call_clause(
    input: &'_ str,
) -> IResult<&'_ str, CallClause<'_>, CypherParsingError<'_>> {
    let (input, _) = ws(tag_no_case("CALL")).parse(input)?;
    let (input, procedure) = parse_procedure_name(input).map_err(promote)?;

    let (input, arguments) = opt(delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), |i| {
            expression::parse_expression(i).map_err(promote)
        }),
        ws(char(')')),
    ))
    .parse(input)?;

    let (input, yield_items) = opt(preceded(
        ws(tag_no_case("YIELD")),
        separated_list1(ws(char(',')), ws(yield_identifier)),
    ))
    .parse(input)?;

    Ok((
        input,
        CallClause {
            procedure,
            arguments: arguments.unwrap_or_default(),
            yield_items,
        },
    ))
}

fn yield_identifier(input: &str) -> IResult<&str, &str, CypherParsingError<'_>> {
    common::parse_identifier(input).map_err(promote)
}

/// Dotted procedure name: `db.labels`, `dbms.components`.
fn parse_procedure_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        common::parse_identifier,
        many0(pair(char('.'), common::parse_identifier)),
    ))
    .parse(input)
}
