//! cyphergres — Cypher-to-PostgreSQL query translation.
//!
//! Translates a Cypher-subset property-graph query into a parameterized SQL
//! statement over a fixed two-table schema (`graph_nodes` / `graph_edges`
//! with JSONB property bags):
//! - Parsing: nom-based recursive descent producing a typed AST
//! - Generation: a recursive walk emitting SQL text plus an ordered
//!   parameter vector (`$1, $2, …`)
//! - Multi-tenancy: an opaque `group_id` filter injected into every query
//!
//! ```no_run
//! use cyphergres::Translator;
//! use std::collections::HashMap;
//!
//! let translator = Translator::new("tenant-1");
//! let (sql, params) = translator
//!     .translate("MATCH (n:Entity) WHERE n.age > 30 RETURN n", &HashMap::new())
//!     .unwrap();
//! # let _ = (sql, params);
//! ```

pub mod cypher_parser;
pub mod postgres_query_generator;
mod translator;

pub use postgres_query_generator::{PostgresQueryGeneratorError, SqlGenerator};
pub use translator::{TranslateError, Translator};
