use serde_json::{json, Value};

use crate::cypher_parser::ast::{
    CreateClause, DeleteClause, Expression, MergeClause, NodePattern, RemoveClause, SetClause,
    SetItem,
};

use super::context::TranslationContext;
use super::errors::PostgresQueryGeneratorError;
use super::expression::{evaluate_literal, to_json_text, translate_expression};
use super::query_builder::QueryState;
use super::schema::{self, EDGE_TABLE, NODE_TABLE};

type Result<T> = std::result::Result<T, PostgresQueryGeneratorError>;

/// `CREATE (n:Label {…})` → INSERT. Only node patterns translate; edges are
/// out of reach of a single-row INSERT against this schema.
pub(crate) fn build_create(
    ctx: &mut TranslationContext<'_>,
    clause: &CreateClause<'_>,
) -> Result<String> {
    let node = single_node(clause.patterns.first().map(|p| p.elements.as_slice()))?;
    let values = NodeInsertValues::bind(ctx, node, None)?;

    Ok(format!(
        "INSERT INTO {table} (uuid, name, node_type, group_id, properties, valid_at)\n\
         VALUES (\n\
         \x20   gen_random_uuid(),\n\
         \x20   {name},\n\
         \x20   {node_type},\n\
         \x20   {group},\n\
         \x20   {properties},\n\
         \x20   CURRENT_TIMESTAMP\n\
         )\n\
         RETURNING uuid, name, node_type, properties",
        table = NODE_TABLE,
        name = values.name,
        node_type = values.node_type,
        group = values.group,
        properties = values.properties,
    ))
}

/// `MERGE (n:Label {…})` → INSERT … ON CONFLICT (uuid) DO UPDATE.
/// ON CREATE SET literals fold into the inserted property bag; ON MATCH SET
/// property items stack `jsonb_set` calls over EXCLUDED.properties.
pub(crate) fn build_merge(
    ctx: &mut TranslationContext<'_>,
    clause: &MergeClause<'_>,
) -> Result<String> {
    let node = single_node(Some(clause.pattern.elements.as_slice()))?;
    let values = NodeInsertValues::bind(ctx, node, clause.on_create.as_deref())?;

    let mut properties_update = "EXCLUDED.properties".to_string();
    if let Some(items) = &clause.on_match {
        for item in items {
            if let (Some(key), Some(value)) = (item.property_key, &item.value) {
                let rendered = translate_jsonb_value(ctx, value)?;
                properties_update =
                    format!("jsonb_set({}, '{{{}}}', {})", properties_update, key, rendered);
            }
        }
    }

    Ok(format!(
        "INSERT INTO {table} (uuid, name, node_type, group_id, properties, valid_at)\n\
         VALUES (\n\
         \x20   gen_random_uuid(),\n\
         \x20   {name},\n\
         \x20   {node_type},\n\
         \x20   {group},\n\
         \x20   {properties},\n\
         \x20   CURRENT_TIMESTAMP\n\
         )\n\
         ON CONFLICT (uuid) DO UPDATE SET\n\
         \x20   name = EXCLUDED.name,\n\
         \x20   properties = {update},\n\
         \x20   valid_at = CURRENT_TIMESTAMP\n\
         RETURNING uuid, name, node_type",
        table = NODE_TABLE,
        name = values.name,
        node_type = values.node_type,
        group = values.group,
        properties = values.properties,
        update = properties_update,
    ))
}

/// `DELETE v` scopes the target rows with the accumulated MATCH context;
/// `DETACH DELETE` first removes edges touching the node from either side.
pub(crate) fn build_delete(
    ctx: &mut TranslationContext<'_>,
    state: &QueryState,
    clause: &DeleteClause<'_>,
) -> Result<String> {
    let variable = clause
        .expressions
        .iter()
        .find_map(|expr| match expr {
            Expression::Variable(name) => Some(*name),
            _ => None,
        })
        .ok_or(PostgresQueryGeneratorError::UnsupportedExpression(
            "DELETE of a non-variable expression",
        ))?;

    let subquery = match_subquery(ctx, state, variable)?;

    if clause.detach {
        Ok(format!(
            "DELETE FROM {edges} WHERE source_node_uuid IN ({sub}) OR target_node_uuid IN ({sub});\n\
             DELETE FROM {nodes} WHERE uuid IN ({sub})",
            edges = EDGE_TABLE,
            nodes = NODE_TABLE,
            sub = subquery,
        ))
    } else {
        Ok(format!(
            "DELETE FROM {nodes} WHERE uuid IN ({sub})",
            nodes = NODE_TABLE,
            sub = subquery,
        ))
    }
}

/// `SET` → UPDATE over the matched rows. Items touching the same column
/// fold into one assignment chain, since SQL rejects repeated assignments
/// to a column within one SET list.
pub(crate) fn build_set(
    ctx: &mut TranslationContext<'_>,
    state: &QueryState,
    clause: &SetClause<'_>,
) -> Result<String> {
    let mut properties_expr = "properties".to_string();
    let mut properties_changed = false;
    let mut metadata_expr = "metadata".to_string();
    let mut metadata_changed = false;

    for item in &clause.items {
        if let Some(label) = item.label {
            let text = to_json_text(&json!(label))?;
            let placeholder = ctx.bind(Value::String(text));
            metadata_expr = format!(
                "jsonb_set({}, '{{label}}', {}::jsonb)",
                metadata_expr, placeholder
            );
            metadata_changed = true;
        } else if let Some(value) = &item.value {
            let rendered = translate_jsonb_value(ctx, value)?;
            if item.merge_properties {
                properties_expr = format!("{} || {}", properties_expr, rendered);
            } else if let Some(key) = item.property_key {
                properties_expr =
                    format!("jsonb_set({}, '{{{}}}', {})", properties_expr, key, rendered);
            } else {
                properties_expr = rendered;
            }
            properties_changed = true;
        }
    }

    let mut assignments = Vec::new();
    if properties_changed {
        assignments.push(format!("properties = {}", properties_expr));
    }
    if metadata_changed {
        assignments.push(format!("metadata = {}", metadata_expr));
    }
    if assignments.is_empty() {
        return Err(PostgresQueryGeneratorError::EmptyQuery);
    }

    let first = clause
        .items
        .first()
        .ok_or(PostgresQueryGeneratorError::EmptyQuery)?;
    let subquery = match_subquery(ctx, state, first.variable)?;
    Ok(format!(
        "UPDATE {} SET {} WHERE uuid IN ({})",
        NODE_TABLE,
        assignments.join(", "),
        subquery
    ))
}

/// `REMOVE v.key` / `REMOVE v:Label` → JSONB key deletion, folded per
/// column like SET.
pub(crate) fn build_remove(
    ctx: &TranslationContext<'_>,
    state: &QueryState,
    clause: &RemoveClause<'_>,
) -> Result<String> {
    let mut properties_expr = "properties".to_string();
    let mut properties_changed = false;
    let mut metadata_changed = false;

    for item in &clause.items {
        if item.label.is_some() {
            metadata_changed = true;
        } else if let Some(key) = item.property_key {
            properties_expr = format!("{} - '{}'", properties_expr, key);
            properties_changed = true;
        }
    }

    let mut assignments = Vec::new();
    if properties_changed {
        assignments.push(format!("properties = {}", properties_expr));
    }
    if metadata_changed {
        assignments.push("metadata = metadata - 'label'".to_string());
    }
    if assignments.is_empty() {
        return Err(PostgresQueryGeneratorError::EmptyQuery);
    }

    let first = clause
        .items
        .first()
        .ok_or(PostgresQueryGeneratorError::EmptyQuery)?;
    let subquery = match_subquery(ctx, state, first.variable)?;
    Ok(format!(
        "UPDATE {} SET {} WHERE uuid IN ({})",
        NODE_TABLE,
        assignments.join(", "),
        subquery
    ))
}

/// The `uuid IN (…)` scoping subquery carrying the MATCH context: its FROM,
/// its joins, and every accumulated predicate (tenant filter included).
fn match_subquery(
    ctx: &TranslationContext<'_>,
    state: &QueryState,
    variable: &str,
) -> Result<String> {
    let alias = ctx
        .lookup_alias(variable)
        .ok_or_else(|| PostgresQueryGeneratorError::UnboundVariable(variable.to_string()))?
        .to_string();

    let from = state
        .from_clause()
        .unwrap_or_else(|| format!("{} {}", NODE_TABLE, alias));
    let mut subquery = format!("SELECT {}.uuid FROM {}", alias, from);
    if !state.where_parts.is_empty() {
        subquery.push_str(&format!(" WHERE {}", state.where_parts.join(" AND ")));
    }
    Ok(subquery)
}

/// Literal or parameter values destined for a JSONB position bind their JSON
/// serialization and cast; computed expressions wrap in `to_jsonb`.
fn translate_jsonb_value(
    ctx: &mut TranslationContext<'_>,
    expr: &Expression<'_>,
) -> Result<String> {
    match evaluate_literal(ctx, expr) {
        Ok(value) => {
            let text = to_json_text(&value)?;
            let placeholder = ctx.bind(Value::String(text));
            Ok(format!("{}::jsonb", placeholder))
        }
        Err(PostgresQueryGeneratorError::NonLiteralMapValue(_)) => {
            let sql = translate_expression(ctx, &[], expr)?;
            Ok(format!("to_jsonb({})", sql))
        }
        Err(other) => Err(other),
    }
}

struct NodeInsertValues {
    name: String,
    node_type: String,
    group: String,
    properties: String,
}

impl NodeInsertValues {
    /// Bind the four INSERT parameters for a node pattern: name, node type
    /// (first label against the reserved set, else 'entity'), tenant id, and
    /// the JSON-serialized property bag.
    fn bind(
        ctx: &mut TranslationContext<'_>,
        node: &NodePattern<'_>,
        extra_items: Option<&[SetItem<'_>]>,
    ) -> Result<Self> {
        let mut properties = serde_json::Map::new();
        if let Some(entries) = &node.properties {
            for (key, value_expr) in entries {
                properties.insert((*key).to_string(), evaluate_literal(ctx, value_expr)?);
            }
        }
        if let Some(items) = extra_items {
            for item in items {
                if let (Some(key), Some(value)) = (item.property_key, &item.value) {
                    properties.insert(key.to_string(), evaluate_literal(ctx, value)?);
                }
            }
        }

        let node_type = match node.first_label() {
            Some(label) if schema::is_reserved_node_type(label) => label.to_lowercase(),
            _ => "entity".to_string(),
        };
        let name_value = properties
            .get("name")
            .cloned()
            .unwrap_or(Value::String(String::new()));

        let name = ctx.bind(name_value);
        let node_type = ctx.bind(json!(node_type));
        let group_id = ctx.group_id().to_string();
        let group = ctx.bind(json!(group_id));
        let properties = ctx.bind(Value::String(to_json_text(&Value::Object(properties))?));

        Ok(NodeInsertValues {
            name,
            node_type,
            group,
            properties,
        })
    }
}

fn single_node<'e, 'q>(
    elements: Option<&'e [crate::cypher_parser::ast::PatternElement<'q>]>,
) -> Result<&'e NodePattern<'q>> {
    let element = elements
        .and_then(|e| e.first())
        .ok_or(PostgresQueryGeneratorError::EmptyQuery)?;
    if !element.relationships.is_empty() {
        return Err(PostgresQueryGeneratorError::UnsupportedCreatePattern);
    }
    element
        .nodes
        .first()
        .ok_or(PostgresQueryGeneratorError::EmptyQuery)
}
