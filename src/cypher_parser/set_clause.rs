use nom::{
    bytes::complete::{tag, tag_no_case},
    character::complete::char,
    multi::separated_list1,
    IResult, Parser,
};

use super::ast::{SetClause, SetItem};
use super::common::{self, ws};
use super::errors::{promote, CypherParsingError};
use super::expression;

/// `SET item[, item…]`
pub fn parse_set_clause(
    input: &'_ str,
) -> IResult<&'_ str, SetClause<'_>, CypherParsingError<'_>> {
    let (input, _) = ws(tag_no_case("SET")).parse(input)?;
    let (input, items) = parse_set_items(input)?;
    Ok((input, SetClause { items }))
}

/// The bare item list, shared with MERGE's ON MATCH / ON CREATE actions.
pub(super) fn parse_set_items(
    input: &'_ str,
) -> IResult<&'_ str, Vec<SetItem<'_>>, CypherParsingError<'_>> {
    separated_list1(ws(char(',')), |i| parse_set_item(i).map_err(promote)).parse(input)
}

/// One of: `v.key = e`, `v += map`, `v = e`, `v:Label`.
fn parse_set_item(input: &'_ str) -> IResult<&'_ str, SetItem<'_>> {
    let (input, variable) = ws(common::parse_identifier).parse(input)?;

    let plus_eq: IResult<&str, &str> = ws(tag("+=")).parse(input);
    if let Ok((rest, _)) = plus_eq {
        let (rest, value) = expression::parse_expression(rest)?;
        return Ok((
            rest,
            SetItem {
                variable,
                property_key: None,
                value: Some(value),
                label: None,
                merge_properties: true,
            },
        ));
    }

    let dot: IResult<&str, char> = ws(char('.')).parse(input);
    if let Ok((rest, _)) = dot {
        let (rest, key) = ws(common::parse_identifier).parse(rest)?;
        let (rest, _) = ws(char('=')).parse(rest)?;
        let (rest, value) = expression::parse_expression(rest)?;
        return Ok((
            rest,
            SetItem {
                variable,
                property_key: Some(key),
                value: Some(value),
                label: None,
                merge_properties: false,
            },
        ));
    }

    let colon: IResult<&str, char> = ws(char(':')).parse(input);
    if let Ok((rest, _)) = colon {
        let (rest, label) = ws(common::parse_identifier).parse(rest)?;
        return Ok((
            rest,
            SetItem {
                variable,
                property_key: None,
                value: None,
                label: Some(label),
                merge_properties: false,
            },
        ));
    }

    let (input, _) = ws(char('=')).parse(input)?;
    let (input, value) = expression::parse_expression(input)?;
    Ok((
        input,
        SetItem {
            variable,
            property_key: None,
            value: Some(value),
            label: None,
            merge_properties: false,
        },
    ))
}
