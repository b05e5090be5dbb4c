use crate::cypher_parser::ast::{Direction, RelationshipPattern};
use serde_json::json;

use super::context::TranslationContext;
use super::errors::PostgresQueryGeneratorError;
use super::expression::evaluate_literal;
use super::schema::{EDGE_TABLE, NODE_TABLE};

/// Bound applied when a hop range has no upper limit. Keeps the recursion
/// finite on cyclic data; raise it if the domain needs deeper traversal.
const DEFAULT_MAX_HOPS: u32 = 999;

/// Rendered pieces of one variable-length expansion: the recursive CTE body
/// (without the `WITH RECURSIVE` prefix), the join anchoring the start node,
/// and the join or predicate connecting the end node.
pub(crate) struct VariableLengthCte {
    pub cte: String,
    pub start_join: String,
    /// JOIN for a fresh target node alias.
    pub target_join: String,
    /// Equality predicate used instead of `target_join` when the target
    /// variable is already bound.
    pub target_condition: String,
}

/// Generates the recursive CTE for a hop-bounded relationship:
/// seed at depth 1, extend one edge at a time, refuse to revisit edges.
pub(crate) struct VariableLengthCteGenerator<'q, 'r> {
    cte_name: String,
    relationship: &'r RelationshipPattern<'q>,
    source_alias: String,
    target_alias: String,
    optional: bool,
}

impl<'q, 'r> VariableLengthCteGenerator<'q, 'r> {
    pub fn new(
        cte_name: String,
        relationship: &'r RelationshipPattern<'q>,
        source_alias: String,
        target_alias: String,
        optional: bool,
    ) -> Self {
        VariableLengthCteGenerator {
            cte_name,
            relationship,
            source_alias,
            target_alias,
            optional,
        }
    }

    pub fn generate(
        &self,
        ctx: &mut TranslationContext<'_>,
    ) -> Result<VariableLengthCte, PostgresQueryGeneratorError> {
        let min_hops = self.relationship.min_hops.unwrap_or(1);
        let max_hops = self.relationship.max_hops.unwrap_or(DEFAULT_MAX_HOPS);

        // Undirected traversal expands as outgoing at this layer.
        let (source_col, target_col) = match self.relationship.direction {
            Direction::Incoming => ("target_node_uuid", "source_node_uuid"),
            Direction::Outgoing | Direction::Either => ("source_node_uuid", "target_node_uuid"),
        };

        // Type and property constraints are bound once; the seed and the
        // recursive arm reference the same placeholders.
        let mut seed_conditions: Vec<String> = Vec::new();
        let mut step_conditions: Vec<String> = Vec::new();

        if !self.relationship.types.is_empty() {
            let mut seed_types = Vec::new();
            let mut step_types = Vec::new();
            for relation_type in &self.relationship.types {
                let placeholder = ctx.bind(json!(relation_type));
                seed_types.push(format!("relation_type = {}", placeholder));
                step_types.push(format!("e.relation_type = {}", placeholder));
            }
            seed_conditions.push(format!("({})", seed_types.join(" OR ")));
            step_conditions.push(format!("({})", step_types.join(" OR ")));
        }

        if let Some(properties) = &self.relationship.properties {
            for (key, value_expr) in properties {
                let value = evaluate_literal(ctx, value_expr)?;
                let placeholder = ctx.bind(value);
                seed_conditions.push(format!("properties->>'{}' = {}", key, placeholder));
                step_conditions.push(format!("e.properties->>'{}' = {}", key, placeholder));
            }
        }

        let seed_filter = if seed_conditions.is_empty() {
            String::new()
        } else {
            format!("    WHERE {}\n", seed_conditions.join(" AND "))
        };
        let step_filter = if step_conditions.is_empty() {
            String::new()
        } else {
            format!("      AND {}\n", step_conditions.join(" AND "))
        };

        let mut cte = format!("{} AS (\n", self.cte_name);
        cte.push_str(&format!(
            "    SELECT {} AS start_id, {} AS end_id, 1 AS depth,\n",
            source_col, target_col
        ));
        cte.push_str("           ARRAY[uuid] AS path_edges\n");
        cte.push_str(&format!("    FROM {}\n", EDGE_TABLE));
        cte.push_str(&seed_filter);
        cte.push_str("    UNION ALL\n");
        cte.push_str(&format!(
            "    SELECT p.start_id, e.{}, p.depth + 1,\n",
            target_col
        ));
        cte.push_str("           p.path_edges || e.uuid\n");
        cte.push_str(&format!("    FROM {} p\n", self.cte_name));
        cte.push_str(&format!(
            "    JOIN {} e ON p.end_id = e.{}\n",
            EDGE_TABLE, source_col
        ));
        cte.push_str(&format!("    WHERE p.depth < {}\n", max_hops));
        cte.push_str(&step_filter);
        cte.push_str("      AND NOT e.uuid = ANY(p.path_edges)\n)");

        let join_keyword = if self.optional { "LEFT JOIN" } else { "JOIN" };
        let start_join = format!(
            "{} {} ON {}.uuid = {}.start_id AND {}.depth >= {}",
            join_keyword, self.cte_name, self.source_alias, self.cte_name, self.cte_name, min_hops
        );
        let target_join = format!(
            "{} {} {} ON {}.uuid = {}.end_id",
            join_keyword, NODE_TABLE, self.target_alias, self.target_alias, self.cte_name
        );
        let target_condition = format!("{}.uuid = {}.end_id", self.target_alias, self.cte_name);

        Ok(VariableLengthCte {
            cte,
            start_join,
            target_join,
            target_condition,
        })
    }
}
