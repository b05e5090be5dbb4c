use nom::error::{ContextError, ParseError};
use std::fmt;

/// Parse error accumulating (input-slice, message) pairs as the failure
/// bubbles out of the combinator stack. The slices borrow the query text so
/// the facade can recover line/column positions.
#[derive(Debug, PartialEq)]
pub struct CypherParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> CypherParsingError<'a> {
    pub fn new(input: &'a str, message: &'static str) -> Self {
        CypherParsingError {
            errors: vec![(input, message)],
        }
    }

    /// The deepest recorded error position (first entry pushed).
    pub fn location(&self) -> Option<&'a str> {
        self.errors.first().map(|(input, _)| *input)
    }

    /// Human-readable summary, outermost context last.
    pub fn message(&self) -> String {
        let parts: Vec<&str> = self.errors.iter().map(|(_, msg)| *msg).collect();
        parts.join("; ")
    }
}

impl<'a> ParseError<&'a str> for CypherParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        CypherParsingError::new(input, "unexpected token")
    }

    fn append(input: &'a str, _kind: nom::error::ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, "unexpected token"));
        other
    }
}

impl<'a> ContextError<&'a str> for CypherParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for CypherParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            let snippet: String = input.chars().take(40).collect();
            writeln!(f, "{}: {}", ctx, snippet)?;
        }
        Ok(())
    }
}

impl<'a> From<nom::error::Error<&'a str>> for CypherParsingError<'a> {
    fn from(err: nom::error::Error<&'a str>) -> Self {
        CypherParsingError::new(err.input, "unable to parse")
    }
}

/// Promote a plain combinator error to an unrecoverable clause error, the
/// way `cut` does. Once a clause keyword is consumed, a failure inside the
/// clause should not backtrack into trying other clauses.
pub(crate) fn promote(err: nom::Err<nom::error::Error<&'_ str>>) -> nom::Err<CypherParsingError<'_>> {
    match err {
        nom::Err::Incomplete(needed) => nom::Err::Incomplete(needed),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            nom::Err::Failure(CypherParsingError::from(e))
        }
    }
}
