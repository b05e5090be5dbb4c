//! SQL generation: a recursive walk over the parsed query emitting
//! PostgreSQL text with positional placeholders, parameters accumulating in
//! a per-call [`context::TranslationContext`].

use std::collections::HashMap;

use serde_json::Value;

use crate::cypher_parser::ast::Query;

mod context;
mod errors;
mod expression;
mod functions;
mod match_builder;
mod mutations;
mod query_builder;
mod schema;
mod variable_length_cte;

pub use errors::PostgresQueryGeneratorError;
pub use schema::{EDGE_COLUMNS, EDGE_TABLE, NODE_COLUMNS, NODE_TABLE};

/// Stateless generator bound to one tenant. Every [`generate`] call builds
/// its own translation context, so a single instance is safe to reuse and
/// share across threads.
///
/// [`generate`]: SqlGenerator::generate
pub struct SqlGenerator {
    group_id: String,
    strict_bindings: bool,
}

impl SqlGenerator {
    pub fn new(group_id: impl Into<String>) -> Self {
        SqlGenerator {
            group_id: group_id.into(),
            strict_bindings: false,
        }
    }

    /// Error on missing `$name` bindings instead of substituting NULL.
    pub fn with_strict_bindings(mut self, strict: bool) -> Self {
        self.strict_bindings = strict;
        self
    }

    /// Lower a parsed query to `(sql, params)`. The i-th parameter
    /// corresponds to placeholder `$i` (1-based); maps travel JSON-serialized
    /// as strings.
    pub fn generate(
        &self,
        query: &Query<'_>,
        bindings: &HashMap<String, Value>,
    ) -> Result<(String, Vec<Value>), PostgresQueryGeneratorError> {
        let mut ctx =
            context::TranslationContext::new(&self.group_id, bindings, self.strict_bindings);
        let sql = query_builder::build_statement(&mut ctx, query)?;
        let params = ctx.into_params();
        log::debug!(
            "generated SQL with {} parameter(s) for tenant scope",
            params.len()
        );
        Ok((sql, params))
    }
}
