use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace0},
    combinator::{map, opt},
    error::{Error, ErrorKind},
    multi::separated_list0,
    sequence::{delimited, preceded, separated_pair},
    IResult, Parser,
};

use super::ast::{
    BinaryOp, BinaryOperator, CaseExpression, Comparison, ComparisonOperator, Expression,
    FunctionCall, IndexAccess, ListComprehension, Literal, PatternComprehension, PropertyAccess,
    Quantifier, QuantifierKind, UnaryOp, UnaryOperator,
};
use super::common::{self, ws};
use super::path_pattern;

/// Entry point: full precedence ladder, lowest binding first.
pub fn parse_expression(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    parse_logical_or(input)
}

/// Word-boundary-safe keyword matcher. `tag_no_case("IN")` would happily eat
/// the prefix of `Insurance`; this consumes a whole identifier and compares.
fn keyword<'a>(kw: &'static str) -> impl Fn(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (rest, _) = multispace0(input)?;
        let (rest, ident) = common::parse_identifier(rest)?;
        if ident.eq_ignore_ascii_case(kw) {
            Ok((rest, ident))
        } else {
            Err(nom::Err::Error(Error::new(input, ErrorKind::Tag)))
        }
    }
}

fn parse_logical_or(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (mut input, mut expr) = parse_logical_and(input)?;

    // Left-associative chain: a OR b OR c parses as (a OR b) OR c.
    while let Ok((rest, rhs)) = preceded(keyword("OR"), parse_logical_and).parse(input) {
        expr = Expression::BinaryOp(BinaryOp {
            left: Box::new(expr),
            operator: BinaryOperator::Or,
            right: Box::new(rhs),
        });
        input = rest;
    }
    Ok((input, expr))
}

fn parse_logical_and(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (mut input, mut expr) = parse_not(input)?;

    while let Ok((rest, rhs)) = preceded(keyword("AND"), parse_not).parse(input) {
        expr = Expression::BinaryOp(BinaryOp {
            left: Box::new(expr),
            operator: BinaryOperator::And,
            right: Box::new(rhs),
        });
        input = rest;
    }
    Ok((input, expr))
}

fn parse_not(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    if let Ok((rest, _)) = keyword("NOT")(input) {
        // NOT IN is an infix comparison, never a prefix NOT; the comparison
        // parser only sees NOT after a left operand, so no ambiguity here.
        let (rest, operand) = parse_not(rest)?;
        return Ok((
            rest,
            Expression::UnaryOp(UnaryOp {
                operator: UnaryOperator::Not,
                operand: Box::new(operand),
            }),
        ));
    }
    parse_comparison(input)
}

fn parse_comparison_operator(input: &str) -> IResult<&str, ComparisonOperator> {
    alt((
        map(tag(">="), |_| ComparisonOperator::Ge),
        map(tag("<="), |_| ComparisonOperator::Le),
        map(tag("<>"), |_| ComparisonOperator::Ne),
        map(tag("!="), |_| ComparisonOperator::Ne),
        map(tag("=~"), |_| ComparisonOperator::Regex),
        map(tag(">"), |_| ComparisonOperator::Gt),
        map(tag("<"), |_| ComparisonOperator::Lt),
        map(tag("="), |_| ComparisonOperator::Eq),
        map((keyword("NOT"), keyword("IN")), |_| ComparisonOperator::NotIn),
        map(keyword("IN"), |_| ComparisonOperator::In),
        map(keyword("CONTAINS"), |_| ComparisonOperator::Contains),
        map((keyword("STARTS"), keyword("WITH")), |_| {
            ComparisonOperator::StartsWith
        }),
        map((keyword("ENDS"), keyword("WITH")), |_| {
            ComparisonOperator::EndsWith
        }),
    ))
    .parse(input)
}

fn parse_comparison(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, lhs) = parse_additive(input)?;

    // Postfix null checks are arity-1 comparisons.
    if let Ok((rest, (_, not, _))) =
        (keyword("IS"), opt(keyword("NOT")), keyword("NULL")).parse(input)
    {
        let operator = if not.is_some() {
            ComparisonOperator::IsNotNull
        } else {
            ComparisonOperator::IsNull
        };
        return Ok((
            rest,
            Expression::Comparison(Comparison {
                left: Box::new(lhs),
                operator,
                right: None,
            }),
        ));
    }

    match (ws(parse_comparison_operator), parse_additive).parse(input) {
        Ok((rest, (operator, rhs))) => Ok((
            rest,
            Expression::Comparison(Comparison {
                left: Box::new(lhs),
                operator,
                right: Some(Box::new(rhs)),
            }),
        )),
        Err(nom::Err::Incomplete(n)) => Err(nom::Err::Incomplete(n)),
        Err(_) => Ok((input, lhs)),
    }
}

fn parse_additive(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (mut input, mut expr) = parse_multiplicative(input)?;

    loop {
        let op_result: IResult<&str, &str> =
            ws(alt((tag("+"), tag("-")))).parse(input);
        match op_result {
            Ok((rest, op)) => {
                let (rest, rhs) = parse_multiplicative(rest)?;
                let operator = if op == "+" {
                    BinaryOperator::Add
                } else {
                    BinaryOperator::Subtract
                };
                expr = Expression::BinaryOp(BinaryOp {
                    left: Box::new(expr),
                    operator,
                    right: Box::new(rhs),
                });
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, expr))
}

fn parse_multiplicative(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (mut input, mut expr) = parse_power(input)?;

    loop {
        let op_result: IResult<&str, &str> =
            ws(alt((tag("*"), tag("/"), tag("%")))).parse(input);
        match op_result {
            Ok((rest, op)) => {
                let (rest, rhs) = parse_power(rest)?;
                let operator = match op {
                    "*" => BinaryOperator::Multiply,
                    "/" => BinaryOperator::Divide,
                    _ => BinaryOperator::Modulo,
                };
                expr = Expression::BinaryOp(BinaryOp {
                    left: Box::new(expr),
                    operator,
                    right: Box::new(rhs),
                });
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, expr))
}

fn parse_power(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, base) = parse_unary(input)?;

    // Right-associative: 2 ^ 3 ^ 2 is 2 ^ (3 ^ 2).
    match preceded(ws(char('^')), parse_power).parse(input) {
        Ok((rest, exponent)) => Ok((
            rest,
            Expression::BinaryOp(BinaryOp {
                left: Box::new(base),
                operator: BinaryOperator::Power,
                right: Box::new(exponent),
            }),
        )),
        Err(nom::Err::Incomplete(n)) => Err(nom::Err::Incomplete(n)),
        Err(_) => Ok((input, base)),
    }
}

fn parse_unary(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let minus: IResult<&str, char> = ws(char('-')).parse(input);
    if let Ok((rest, _)) = minus {
        let (rest, operand) = parse_unary(rest)?;
        return Ok((
            rest,
            Expression::UnaryOp(UnaryOp {
                operator: UnaryOperator::Minus,
                operand: Box::new(operand),
            }),
        ));
    }
    parse_postfix(input)
}

fn parse_property_lookup(input: &str) -> IResult<&str, &str> {
    preceded(ws(char('.')), common::parse_identifier).parse(input)
}

fn parse_index_lookup(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    delimited(ws(char('[')), ws(parse_expression), char(']')).parse(input)
}

/// Postfix chains: `a.b.c`, `list[0]`, `labels(n)[1]`.
fn parse_postfix(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (mut input, mut expr) = parse_primary(input)?;

    loop {
        if let Ok((rest, key)) = parse_property_lookup(input) {
            expr = Expression::PropertyAccess(PropertyAccess {
                base: Box::new(expr),
                key,
            });
            input = rest;
            continue;
        }
        if let Ok((rest, index)) = parse_index_lookup(input) {
            expr = Expression::IndexAccess(IndexAccess {
                base: Box::new(expr),
                index: Box::new(index),
            });
            input = rest;
            continue;
        }
        break;
    }
    Ok((input, expr))
}

fn parse_primary(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    alt((
        parse_case_expression,
        parse_quantifier,
        parse_function_call,
        parse_parameter,
        parse_bracket_expression,
        parse_map_literal,
        parse_literal_or_variable,
        delimited(ws(char('(')), parse_expression, ws(char(')'))),
    ))
    .parse(input)
}

pub(super) fn parse_parameter(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, name) = common::parse_parameter_name(input)?;
    Ok((input, Expression::Parameter(name)))
}

fn parse_literal_or_variable(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = multispace0(input)?;

    if let Ok((rest, s)) = common::parse_string_literal(input) {
        return Ok((rest, Expression::Literal(Literal::String(s))));
    }
    if let Ok((rest, lit)) = common::parse_number(input) {
        return Ok((rest, Expression::Literal(lit)));
    }

    let (rest, ident) = common::parse_identifier(input)?;
    let expr = if ident.eq_ignore_ascii_case("true") {
        Expression::Literal(Literal::Boolean(true))
    } else if ident.eq_ignore_ascii_case("false") {
        Expression::Literal(Literal::Boolean(false))
    } else if ident.eq_ignore_ascii_case("null") {
        Expression::Literal(Literal::Null)
    } else {
        Expression::Variable(ident)
    };
    Ok((rest, expr))
}

fn parse_function_call(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, name) = common::parse_identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('(')(input)?;

    let (input, distinct) = opt(keyword("DISTINCT")).parse(input)?;

    // COUNT(*) and friends: a bare star is not an expression, so special-case.
    let (input, args) = alt((
        map(ws(tag("*")), |_| vec![Expression::Variable("*")]),
        separated_list0(ws(char(',')), parse_expression),
    ))
    .parse(input)?;

    let (input, _) = ws(char(')')).parse(input)?;

    Ok((
        input,
        Expression::FunctionCall(FunctionCall {
            name,
            args,
            distinct: distinct.is_some(),
        }),
    ))
}

fn parse_quantifier(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, word) = common::parse_identifier(input)?;

    let kind = if word.eq_ignore_ascii_case("all") {
        QuantifierKind::All
    } else if word.eq_ignore_ascii_case("any") {
        QuantifierKind::Any
    } else if word.eq_ignore_ascii_case("none") {
        QuantifierKind::None
    } else if word.eq_ignore_ascii_case("single") {
        QuantifierKind::Single
    } else {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Tag)));
    };

    let (input, _) = ws(char('(')).parse(input)?;
    let (input, variable) = ws(common::parse_identifier).parse(input)?;
    let (input, _) = keyword("IN")(input)?;
    let (input, list) = parse_expression(input)?;
    let (input, filter) = opt(preceded(keyword("WHERE"), parse_expression)).parse(input)?;
    let (input, _) = ws(char(')')).parse(input)?;

    Ok((
        input,
        Expression::Quantifier(Box::new(Quantifier {
            kind,
            variable,
            list,
            filter,
        })),
    ))
}

fn parse_case_expression(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = keyword("CASE")(input)?;

    // Simple CASE carries a test expression; searched CASE jumps straight to
    // WHEN. Peek the next word, because `WHEN` would otherwise parse as a
    // variable.
    let (after_ws, _) = multispace0(input)?;
    let next_is_when = matches!(
        common::parse_identifier(after_ws),
        Ok((_, w)) if w.eq_ignore_ascii_case("WHEN")
    );
    let (input, test) = if next_is_when {
        (input, None)
    } else {
        let (input, expr) = parse_expression(input)?;
        (input, Some(Box::new(expr)))
    };

    let mut alternatives = Vec::new();
    let mut remaining = input;
    loop {
        match preceded(
            keyword("WHEN"),
            separated_pair(parse_expression, keyword("THEN"), parse_expression),
        )
        .parse(remaining)
        {
            Ok((rest, (when, then))) => {
                alternatives.push((when, then));
                remaining = rest;
            }
            Err(nom::Err::Incomplete(n)) => return Err(nom::Err::Incomplete(n)),
            Err(_) => break,
        }
    }
    if alternatives.is_empty() {
        return Err(nom::Err::Error(Error::new(remaining, ErrorKind::Many1)));
    }

    let (input, else_expression) =
        opt(preceded(keyword("ELSE"), parse_expression)).parse(remaining)?;
    let (input, _) = keyword("END")(input)?;

    Ok((
        input,
        Expression::Case(CaseExpression {
            test,
            alternatives,
            else_expression: else_expression.map(Box::new),
        }),
    ))
}

/// Everything that opens with `[`: pattern comprehensions, list
/// comprehensions, then plain list literals. Ordering matters; the first two
/// backtrack cleanly when their distinguishing token (`(` pattern start,
/// `IN`) is absent.
fn parse_bracket_expression(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    alt((
        parse_pattern_comprehension,
        parse_list_comprehension,
        parse_list_literal,
    ))
    .parse(input)
}

fn parse_list_literal(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    map(
        delimited(
            ws(char('[')),
            separated_list0(ws(char(',')), parse_expression),
            ws(char(']')),
        ),
        Expression::List,
    )
    .parse(input)
}

fn parse_list_comprehension(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = ws(char('[')).parse(input)?;
    let (input, variable) = ws(common::parse_identifier).parse(input)?;
    let (input, _) = keyword("IN")(input)?;
    let (input, list) = parse_expression(input)?;
    let (input, filter) = opt(preceded(keyword("WHERE"), parse_expression)).parse(input)?;
    let (input, map_expr) = opt(preceded(ws(char('|')), parse_expression)).parse(input)?;
    let (input, _) = ws(char(']')).parse(input)?;

    Ok((
        input,
        Expression::ListComprehension(Box::new(ListComprehension {
            variable,
            list,
            filter,
            map: map_expr,
        })),
    ))
}

fn parse_pattern_comprehension(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = ws(char('[')).parse(input)?;

    // Optional `p = ` path binding before the pattern.
    let (input, path_variable) = opt(nom::sequence::terminated(
        ws(common::parse_identifier),
        ws(char('=')),
    ))
    .parse(input)?;

    let (input, pattern) = path_pattern::parse_pattern(input)?;

    // A bare node in brackets is `[(x)]`, a one-element list literal; only
    // patterns with at least one relationship are comprehensions.
    if pattern.elements.iter().all(|e| e.relationships.is_empty()) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }

    let (input, filter) = opt(preceded(keyword("WHERE"), parse_expression)).parse(input)?;
    let (input, _) = ws(char('|')).parse(input)?;
    let (input, map_expr) = parse_expression(input)?;
    let (input, _) = ws(char(']')).parse(input)?;

    Ok((
        input,
        Expression::PatternComprehension(Box::new(PatternComprehension {
            path_variable,
            pattern,
            filter,
            map: map_expr,
        })),
    ))
}

fn parse_map_literal(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    map(parse_map_entries, Expression::Map).parse(input)
}

/// `{key: value, …}` — shared with the inline property maps in patterns.
pub(super) fn parse_map_entries(
    input: &'_ str,
) -> IResult<&'_ str, Vec<(&'_ str, Expression<'_>)>> {
    delimited(
        ws(char('{')),
        separated_list0(
            ws(char(',')),
            separated_pair(ws(common::parse_identifier), ws(char(':')), parse_expression),
        ),
        ws(char('}')),
    )
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &str) -> Expression<'_> {
        let (rest, expr) = parse_expression(input).expect("expression should parse");
        assert_eq!(rest.trim(), "", "unparsed input: {rest:?}");
        expr
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse_all("42"), Expression::Literal(Literal::Integer(42)));
        assert_eq!(parse_all("3.5"), Expression::Literal(Literal::Float(3.5)));
        assert_eq!(
            parse_all("'hi'"),
            Expression::Literal(Literal::String("hi".into()))
        );
        assert_eq!(
            parse_all("TRUE"),
            Expression::Literal(Literal::Boolean(true))
        );
        assert_eq!(parse_all("null"), Expression::Literal(Literal::Null));
        assert_eq!(
            parse_all("-7"),
            Expression::UnaryOp(UnaryOp {
                operator: UnaryOperator::Minus,
                operand: Box::new(Expression::Literal(Literal::Integer(7))),
            })
        );
    }

    #[test]
    fn test_parse_property_access_chain() {
        let expr = parse_all("n.address.city");
        let Expression::PropertyAccess(outer) = expr else {
            panic!("expected property access");
        };
        assert_eq!(outer.key, "city");
        let Expression::PropertyAccess(inner) = *outer.base else {
            panic!("expected nested property access");
        };
        assert_eq!(inner.key, "address");
        assert_eq!(*inner.base, Expression::Variable("n"));
    }

    #[test]
    fn test_parse_index_access() {
        let expr = parse_all("xs[0]");
        let Expression::IndexAccess(ix) = expr else {
            panic!("expected index access");
        };
        assert_eq!(*ix.base, Expression::Variable("xs"));
        assert_eq!(*ix.index, Expression::Literal(Literal::Integer(0)));
    }

    #[test]
    fn test_parse_comparison_binary() {
        let expr = parse_all("n.age > 30");
        let Expression::Comparison(cmp) = expr else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.operator, ComparisonOperator::Gt);
        assert!(cmp.right.is_some());
    }

    #[test]
    fn test_parse_null_checks_are_arity_one() {
        let expr = parse_all("n.deleted_at IS NULL");
        let Expression::Comparison(cmp) = expr else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.operator, ComparisonOperator::IsNull);
        assert!(cmp.right.is_none());

        let expr = parse_all("n.name IS NOT NULL");
        let Expression::Comparison(cmp) = expr else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.operator, ComparisonOperator::IsNotNull);
        assert!(cmp.right.is_none());
    }

    #[test]
    fn test_parse_logical_left_associative() {
        let expr = parse_all("a AND b AND c");
        let Expression::BinaryOp(top) = expr else {
            panic!("expected binary op");
        };
        assert_eq!(top.operator, BinaryOperator::And);
        assert_eq!(*top.right, Expression::Variable("c"));
        let Expression::BinaryOp(left) = *top.left else {
            panic!("expected nested AND");
        };
        assert_eq!(left.operator, BinaryOperator::And);
        assert_eq!(*left.left, Expression::Variable("a"));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse_all("a OR b AND c");
        let Expression::BinaryOp(top) = expr else {
            panic!("expected binary op");
        };
        assert_eq!(top.operator, BinaryOperator::Or);
        let Expression::BinaryOp(rhs) = *top.right else {
            panic!("expected AND on the right");
        };
        assert_eq!(rhs.operator, BinaryOperator::And);
    }

    #[test]
    fn test_keyword_boundaries() {
        // `Interest` starts with IN but is a plain variable.
        let expr = parse_all("Interest");
        assert_eq!(expr, Expression::Variable("Interest"));
    }

    #[test]
    fn test_parse_in_and_not_in() {
        let expr = parse_all("n.city IN ['a', 'b']");
        let Expression::Comparison(cmp) = expr else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.operator, ComparisonOperator::In);

        let expr = parse_all("n.city NOT IN ['a']");
        let Expression::Comparison(cmp) = expr else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.operator, ComparisonOperator::NotIn);
    }

    #[test]
    fn test_parse_string_predicates() {
        for (text, op) in [
            ("n.name STARTS WITH 'A'", ComparisonOperator::StartsWith),
            ("n.name ENDS WITH 'z'", ComparisonOperator::EndsWith),
            ("n.name CONTAINS 'mid'", ComparisonOperator::Contains),
            ("n.name =~ 'A.*'", ComparisonOperator::Regex),
        ] {
            let Expression::Comparison(cmp) = parse_all(text) else {
                panic!("expected comparison for {text}");
            };
            assert_eq!(cmp.operator, op, "operator mismatch for {text}");
        }
    }

    #[test]
    fn test_parse_function_call_distinct_and_star() {
        let Expression::FunctionCall(call) = parse_all("count(DISTINCT n)") else {
            panic!("expected function call");
        };
        assert_eq!(call.name, "count");
        assert!(call.distinct);
        assert_eq!(call.args, vec![Expression::Variable("n")]);

        let Expression::FunctionCall(call) = parse_all("count(*)") else {
            panic!("expected function call");
        };
        assert_eq!(call.args, vec![Expression::Variable("*")]);
    }

    #[test]
    fn test_parse_searched_case() {
        let Expression::Case(case) = parse_all("CASE WHEN a > 1 THEN 'big' ELSE 'small' END")
        else {
            panic!("expected case expression");
        };
        assert!(case.test.is_none());
        assert_eq!(case.alternatives.len(), 1);
        assert!(case.else_expression.is_some());
    }

    #[test]
    fn test_parse_simple_case() {
        let Expression::Case(case) = parse_all("CASE n.status WHEN 1 THEN 'on' WHEN 0 THEN 'off' END")
        else {
            panic!("expected case expression");
        };
        assert!(case.test.is_some());
        assert_eq!(case.alternatives.len(), 2);
        assert!(case.else_expression.is_none());
    }

    #[test]
    fn test_parse_list_comprehension() {
        let Expression::ListComprehension(lc) = parse_all("[x IN xs WHERE x > 0 | x * 2]") else {
            panic!("expected list comprehension");
        };
        assert_eq!(lc.variable, "x");
        assert!(lc.filter.is_some());
        assert!(lc.map.is_some());
    }

    #[test]
    fn test_parse_pattern_comprehension() {
        let Expression::PatternComprehension(pc) = parse_all("[(p)-[:KNOWS]->(f) | f.name]")
        else {
            panic!("expected pattern comprehension");
        };
        assert!(pc.path_variable.is_none());
        assert!(pc.filter.is_none());
    }

    #[test]
    fn test_bracket_fallback_to_list_literal() {
        let Expression::List(items) = parse_all("[1, 2, 3]") else {
            panic!("expected list literal");
        };
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_parse_quantifier() {
        let Expression::Quantifier(q) = parse_all("ALL(x IN xs WHERE x > 0)") else {
            panic!("expected quantifier");
        };
        assert_eq!(q.kind, QuantifierKind::All);
        assert_eq!(q.variable, "x");
        assert!(q.filter.is_some());
    }

    #[test]
    fn test_parse_map_literal() {
        let Expression::Map(entries) = parse_all("{name: 'Ada', age: 36}") else {
            panic!("expected map literal");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "name");
    }

    #[test]
    fn test_arithmetic_precedence() {
        let Expression::BinaryOp(top) = parse_all("1 + 2 * 3") else {
            panic!("expected binary op");
        };
        assert_eq!(top.operator, BinaryOperator::Add);
        let Expression::BinaryOp(rhs) = *top.right else {
            panic!("expected multiplication on the right");
        };
        assert_eq!(rhs.operator, BinaryOperator::Multiply);
    }

    #[test]
    fn test_power_right_associative() {
        let Expression::BinaryOp(top) = parse_all("2 ^ 3 ^ 2") else {
            panic!("expected binary op");
        };
        assert_eq!(top.operator, BinaryOperator::Power);
        assert_eq!(*top.left, Expression::Literal(Literal::Integer(2)));
        let Expression::BinaryOp(rhs) = *top.right else {
            panic!("expected nested power");
        };
        assert_eq!(rhs.operator, BinaryOperator::Power);
    }

    #[test]
    fn test_parse_parameter_expression() {
        assert_eq!(parse_all("$uuid"), Expression::Parameter("uuid"));
    }
}
