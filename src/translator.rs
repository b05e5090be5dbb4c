use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::cypher_parser::{self, strip_comments};
use crate::postgres_query_generator::{PostgresQueryGeneratorError, SqlGenerator};

/// Errors surfaced by [`Translator::translate`].
#[derive(Debug, PartialEq, Error)]
pub enum TranslateError {
    /// The grammar did not accept the input. Positions are 1-based and
    /// refer to the comment-stripped query text.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    /// Structurally valid input the generator cannot lower.
    #[error(transparent)]
    Translation(#[from] PostgresQueryGeneratorError),
}

/// The single entry point: text in, `(sql, params)` out.
///
/// A translator is bound to one tenant at construction; the tenant id
/// becomes the `group_id` filter injected into every generated query.
/// Translation is pure CPU with no I/O; instances are cheap and safe to
/// share across threads.
pub struct Translator {
    generator: SqlGenerator,
}

impl Translator {
    pub fn new(group_id: impl Into<String>) -> Self {
        Translator {
            generator: SqlGenerator::new(group_id),
        }
    }

    /// Error on missing `$name` bindings instead of substituting NULL.
    pub fn with_strict_bindings(mut self, strict: bool) -> Self {
        self.generator = self.generator.with_strict_bindings(strict);
        self
    }

    /// Translate one query. `bindings` supplies values for `$name`
    /// parameters. On success the returned parameter vector lines up with
    /// the `$1, $2, …` placeholders in the SQL text; on failure no partial
    /// SQL is ever returned.
    pub fn translate(
        &self,
        query: &str,
        bindings: &HashMap<String, Value>,
    ) -> Result<(String, Vec<Value>), TranslateError> {
        let cleaned = strip_comments(query);
        log::debug!("translating {} byte query", cleaned.len());

        let statement = match cypher_parser::parse_statement(&cleaned) {
            Ok(ast) => ast,
            Err(err) => {
                let (line, column) = err
                    .location()
                    .map(|at| locate(&cleaned, at))
                    .unwrap_or((1, 1));
                return Err(TranslateError::Syntax {
                    line,
                    column,
                    message: err.message(),
                });
            }
        };

        let (sql, params) = self.generator.generate(&statement, bindings)?;
        log::debug!("translated into {} byte statement", sql.len());
        Ok((sql, params))
    }
}

/// 1-based (line, column) of a subslice within the text it borrows from.
fn locate(text: &str, at: &str) -> (usize, usize) {
    let text_start = text.as_ptr() as usize;
    let at_start = at.as_ptr() as usize;
    if at_start < text_start || at_start > text_start + text.len() {
        return (1, 1);
    }
    let offset = at_start - text_start;
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before.chars().rev().take_while(|c| *c != '\n').count() + 1;
    (line, column)
}
