use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{opt, recognize},
    error::{Error, ErrorKind, ParseError},
    sequence::{delimited, pair},
    IResult, Parser,
};

use super::ast::Literal;

/// Whitespace-swallowing combinator used throughout the clause parsers.
pub fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

/// Strip `//` line comments and `/* */` block comments before parsing.
/// String literals are left untouched; newlines terminating line comments
/// are preserved so error positions keep their line numbers. SQL-style `--`
/// is NOT a comment here: `(a)--(b)` is an undirected relationship.
pub fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string: Option<char> = None;
    let mut escape_next = false;

    while let Some(ch) = chars.next() {
        if escape_next {
            result.push(ch);
            escape_next = false;
            continue;
        }
        if in_string.is_some() && ch == '\\' {
            result.push(ch);
            escape_next = true;
            continue;
        }
        if ch == '\'' || ch == '"' {
            if in_string == Some(ch) {
                in_string = None;
            } else if in_string.is_none() {
                in_string = Some(ch);
            }
            result.push(ch);
            continue;
        }
        if in_string.is_some() {
            result.push(ch);
            continue;
        }

        // Line comment: //
        if ch == '/' && chars.peek() == Some(&'/') {
            chars.next();
            for c in chars.by_ref() {
                if c == '\n' {
                    result.push('\n');
                    break;
                }
            }
            continue;
        }
        // Block comment: /* */
        if ch == '/' && chars.peek() == Some(&'*') {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    break;
                }
            }
            continue;
        }

        result.push(ch);
    }

    result
}

/// Unquoted identifier: alphanumerics and underscores, not starting with a
/// digit. Used for variables, labels, property keys and aliases.
pub fn parse_identifier(input: &str) -> IResult<&str, &str> {
    let (rest, ident) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)?;
    match ident.chars().next() {
        Some(c) if c.is_ascii_digit() => {
            Err(nom::Err::Error(Error::new(input, ErrorKind::AlphaNumeric)))
        }
        _ => Ok((rest, ident)),
    }
}

/// Case-insensitive check used to keep keywords out of identifier positions.
pub fn is_keyword(ident: &str, keyword: &str) -> bool {
    ident.eq_ignore_ascii_case(keyword)
}

/// Numeric literal: `123`, `3.14`, `.5`, `1.5e10`. The sign is handled by
/// the unary-minus expression parser.
pub fn parse_number(input: &str) -> IResult<&str, Literal> {
    let (rest, text) = recognize(pair(
        alt((
            recognize((digit1, char('.'), digit1)),
            recognize(pair(char('.'), digit1)),
            digit1,
        )),
        opt(recognize((
            alt((char('e'), char('E'))),
            opt(alt((char('+'), char('-')))),
            digit1,
        ))),
    ))
    .parse(input)?;

    if text.contains('.') || text.contains('e') || text.contains('E') {
        match text.parse::<f64>() {
            Ok(f) => Ok((rest, Literal::Float(f))),
            Err(_) => Err(nom::Err::Error(Error::new(input, ErrorKind::Float))),
        }
    } else {
        match text.parse::<i64>() {
            Ok(n) => Ok((rest, Literal::Integer(n))),
            Err(_) => Err(nom::Err::Error(Error::new(input, ErrorKind::Digit))),
        }
    }
}

/// Quoted string literal (single or double quotes) with escape sequences
/// interpreted: \n, \t, \r, \\, \', \". Unknown escapes keep the escaped
/// character.
pub fn parse_string_literal(input: &str) -> IResult<&str, String> {
    let mut chars = input.char_indices();
    let quote = match chars.next() {
        Some((_, c @ ('\'' | '"'))) => c,
        _ => return Err(nom::Err::Error(Error::new(input, ErrorKind::Char))),
    };

    let mut out = String::new();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some((_, escaped)) => out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                }),
                None => return Err(nom::Err::Error(Error::new(input, ErrorKind::Escaped))),
            }
        } else if c == quote {
            return Ok((&input[i + c.len_utf8()..], out));
        } else {
            out.push(c);
        }
    }

    // Unterminated string.
    Err(nom::Err::Error(Error::new(input, ErrorKind::TakeUntil)))
}

/// Parse a `$name` parameter reference, returning the bare name.
pub fn parse_parameter_name(input: &str) -> IResult<&str, &str> {
    let (input, _) = tag("$")(input)?;
    parse_identifier(input)
}
