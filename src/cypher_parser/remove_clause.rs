use nom::{
    bytes::complete::tag_no_case,
    character::complete::char,
    multi::separated_list1,
    IResult, Parser,
};

use super::ast::{RemoveClause, RemoveItem};
use super::common::{self, ws};
use super::errors::{promote, CypherParsingError};

/// `REMOVE v.key` or `REMOVE v:Label`, comma-separated.
pub fn parse_remove_clause(
    input: &'_ str,
) -> IResult<&'_ str, RemoveClause<'_>, CypherParsingError<'_>> {
    let (input, _) = ws(tag_no_case("REMOVE")).parse(input)?;
    let (input, items) =
        separated_list1(ws(char(',')), |i| parse_remove_item(i).map_err(promote)).parse(input)?;
    Ok((input, RemoveClause { items }))
}

fn parse_remove_item(input: &'_ str) -> IResult<&'_ str, RemoveItem<'_>> {
    let (input, variable) = ws(common::parse_identifier).parse(input)?;

    let dot: IResult<&str, char> = ws(char('.')).parse(input);
    if let Ok((rest, _)) = dot {
        let (rest, key) = ws(common::parse_identifier).parse(rest)?;
        return Ok((
            rest,
            RemoveItem {
                variable,
                property_key: Some(key),
                label: None,
            },
        ));
    }

    let (input, _) = ws(char(':')).parse(input)?;
    let (input, label) = ws(common::parse_identifier).parse(input)?;
    Ok((
        input,
        RemoveItem {
            variable,
            property_key: None,
            label: Some(label),
        },
    ))
}
