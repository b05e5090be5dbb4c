use nom::{
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0},
    combinator::{map, opt},
    error::{Error, ErrorKind},
    multi::{many0, separated_list1},
    sequence::{preceded, terminated},
    IResult, Parser,
};

use super::ast::{Direction, MapEntries, NodePattern, Pattern, PatternElement, RelationshipPattern};
use super::common::{self, ws};
use super::expression;

/// Cap on consecutive relationships in one chain. Protects the recursive
/// descent from adversarial inputs; real queries rarely exceed 10 hops.
const MAX_RELATIONSHIP_CHAIN_DEPTH: usize = 50;

/// Parse a pattern: `[p =] (a)-[r:T]->(b)<-[:U]-(c)…`
pub fn parse_pattern(input: &'_ str) -> IResult<&'_ str, Pattern<'_>> {
    let (input, path_variable) = opt(terminated(
        ws(common::parse_identifier),
        ws(char('=')),
    ))
    .parse(input)?;

    let (input, element) = parse_pattern_element(input)?;
    Ok((
        input,
        Pattern {
            path_variable,
            elements: vec![element],
        },
    ))
}

/// Node/relationship chain. The invariant `relationships == nodes - 1` holds
/// by construction: every accepted relationship is followed by its node.
fn parse_pattern_element(input: &'_ str) -> IResult<&'_ str, PatternElement<'_>> {
    let (mut input, first) = parse_node_pattern(input)?;
    let mut nodes = vec![first];
    let mut relationships = Vec::new();

    loop {
        match parse_relationship_pattern(input) {
            Ok((rest, relationship)) => {
                if relationships.len() >= MAX_RELATIONSHIP_CHAIN_DEPTH {
                    return Err(nom::Err::Failure(Error::new(input, ErrorKind::TooLarge)));
                }
                let (rest, node) = parse_node_pattern(rest)?;
                relationships.push(relationship);
                nodes.push(node);
                input = rest;
            }
            Err(nom::Err::Incomplete(n)) => return Err(nom::Err::Incomplete(n)),
            Err(_) => break,
        }
    }

    Ok((input, PatternElement { nodes, relationships }))
}

/// `(var:Label1:Label2 {key: value})` — every piece optional.
pub fn parse_node_pattern(input: &'_ str) -> IResult<&'_ str, NodePattern<'_>> {
    let (input, _) = ws(char('(')).parse(input)?;
    let (input, variable) = opt(ws(common::parse_identifier)).parse(input)?;
    let (input, labels) =
        many0(preceded(ws(char(':')), ws(common::parse_identifier))).parse(input)?;
    let (input, properties) = opt(parse_inline_properties).parse(input)?;
    let (input, _) = ws(char(')')).parse(input)?;

    Ok((
        input,
        NodePattern {
            variable,
            labels,
            properties,
        },
    ))
}

fn parse_inline_properties(input: &'_ str) -> IResult<&'_ str, MapEntries<'_>> {
    expression::parse_map_entries(input)
}

/// One unified arrow parser covers all six relationship spellings:
/// `--`, `-->`, `<--`, `-[…]-`, `-[…]->`, `<-[…]-`.
fn parse_relationship_pattern(input: &'_ str) -> IResult<&'_ str, RelationshipPattern<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, left_arrow) = opt(char('<')).parse(input)?;
    let (input, _) = ws(char('-')).parse(input)?;
    let (input, detail) = opt(parse_relationship_detail).parse(input)?;
    let (input, _) = ws(char('-')).parse(input)?;
    let (input, right_arrow) = opt(char('>')).parse(input)?;

    let direction = match (left_arrow.is_some(), right_arrow.is_some()) {
        (true, false) => Direction::Incoming,
        (false, true) => Direction::Outgoing,
        _ => Direction::Either,
    };

    let (variable, types, properties, hops) = detail.unwrap_or((None, Vec::new(), None, None));
    let (min_hops, max_hops) = match hops {
        Some(bounds) => (bounds.0, bounds.1),
        None => (None, None),
    };

    Ok((
        input,
        RelationshipPattern {
            variable,
            types,
            properties,
            direction,
            min_hops,
            max_hops,
        },
    ))
}

type RelationshipDetail<'a> = (
    Option<&'a str>,
    Vec<&'a str>,
    Option<MapEntries<'a>>,
    Option<(Option<u32>, Option<u32>)>,
);

/// The bracketed part: `[var:TYPE1|TYPE2 *1..3 {key: value}]`.
fn parse_relationship_detail(input: &'_ str) -> IResult<&'_ str, RelationshipDetail<'_>> {
    let (input, _) = ws(char('[')).parse(input)?;
    let (input, variable) = opt(ws(common::parse_identifier)).parse(input)?;
    let (input, types) = opt(preceded(ws(char(':')), parse_relationship_types)).parse(input)?;
    let (input, hops) = opt(parse_hop_spec).parse(input)?;
    let (input, properties) = opt(parse_inline_properties).parse(input)?;
    let (input, _) = ws(char(']')).parse(input)?;

    Ok((
        input,
        (variable, types.unwrap_or_default(), properties, hops),
    ))
}

/// Type alternation accepts both `:A|B` and `:A|:B`.
fn parse_relationship_types(input: &'_ str) -> IResult<&'_ str, Vec<&'_ str>> {
    separated_list1(
        ws(char('|')),
        preceded(opt(ws(char(':'))), ws(common::parse_identifier)),
    )
    .parse(input)
}

/// Hop bounds, collapsed to (min, max) at parse time:
/// `*` → (1, ∞), `*n` → (n, n), `*n..` → (n, ∞), `*..m` → (1, m),
/// `*n..m` → (n, m). ∞ is represented as None.
fn parse_hop_spec(input: &'_ str) -> IResult<&'_ str, (Option<u32>, Option<u32>)> {
    let (input, _) = ws(char('*')).parse(input)?;
    let (input, low) = opt(map(digit1, parse_u32)).parse(input)?;
    let (input, dots) = opt(tag("..")).parse(input)?;
    let (input, high) = if dots.is_some() {
        opt(map(digit1, parse_u32)).parse(input)?
    } else {
        (input, None)
    };

    let bounds = match (low, dots.is_some(), high) {
        (None, false, _) => (Some(1), None),
        (Some(n), false, _) => (Some(n), Some(n)),
        (Some(n), true, None) => (Some(n), None),
        (None, true, m) => (Some(1), m),
        (Some(n), true, Some(m)) => (Some(n), Some(m)),
    };

    if let (Some(n), Some(m)) = bounds {
        if n > m {
            return Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify)));
        }
    }

    Ok((input, bounds))
}

fn parse_u32(digits: &str) -> u32 {
    // digit1 guarantees ASCII digits; saturate rather than panic on absurd input.
    digits.parse::<u32>().unwrap_or(u32::MAX)
}
