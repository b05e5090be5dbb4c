use serde_json::{json, Value};

use crate::cypher_parser::ast::{Direction, MatchClause, NodePattern, PatternElement};

use super::context::TranslationContext;
use super::errors::PostgresQueryGeneratorError;
use super::expression::{evaluate_literal, to_json_text, translate_expression};
use super::query_builder::QueryState;
use super::schema::{self, EDGE_TABLE, NODE_TABLE};
use super::variable_length_cte::VariableLengthCteGenerator;

type Result<T> = std::result::Result<T, PostgresQueryGeneratorError>;

/// Lower one MATCH clause into the accumulating query state: FROM entries
/// for fresh first nodes, JOINs for each relationship step, label/property
/// predicates, and the per-clause tenant filter.
pub(crate) fn build_match(
    ctx: &mut TranslationContext<'_>,
    state: &mut QueryState,
    clause: &MatchClause<'_>,
) -> Result<()> {
    let mut anchor_alias: Option<String> = None;

    for pattern in &clause.patterns {
        for element in &pattern.elements {
            if element.nodes.len() != element.relationships.len() + 1 {
                return Err(PostgresQueryGeneratorError::MalformedPattern {
                    nodes: element.nodes.len(),
                    relationships: element.relationships.len(),
                });
            }

            // Resolve variable names up front; anonymous nodes get synthetic
            // names so the chain walk can refer back to them.
            let node_vars: Vec<String> = element
                .nodes
                .iter()
                .map(|node| match node.variable {
                    Some(variable) => variable.to_string(),
                    None => ctx.synth_name("node"),
                })
                .collect();

            let first = &element.nodes[0];
            let first_bound = ctx.has_alias(&node_vars[0]);
            let first_alias = ctx.alias_for(&node_vars[0], NODE_TABLE);
            if anchor_alias.is_none() {
                anchor_alias = Some(first_alias.clone());
            }

            if !first_bound {
                let entry = format!("{} {}", NODE_TABLE, first_alias);
                let filters = node_filters(ctx, first, &first_alias)?;
                if clause.optional && state.has_from() {
                    // An unbound first node under OPTIONAL MATCH must not
                    // filter rows away: constraints ride in the ON clause.
                    let on = if filters.is_empty() {
                        "TRUE".to_string()
                    } else {
                        filters.join(" AND ")
                    };
                    state.add_join_to_last(format!("LEFT JOIN {} ON {}", entry, on), &first_alias);
                } else {
                    state.add_block(entry, Some(&first_alias));
                    state.where_parts.extend(filters);
                }
            }

            for index in 0..element.relationships.len() {
                build_relationship_join(ctx, state, element, &node_vars, index, clause.optional)?;
            }
        }
    }

    // Tenant filter, once per MATCH, anchored at the clause's first alias.
    if let Some(anchor) = anchor_alias {
        let group_id = ctx.group_id().to_string();
        let placeholder = ctx.bind(json!(group_id));
        state
            .where_parts
            .push(format!("{}.group_id = {}", anchor, placeholder));
    }

    if let Some(predicate) = &clause.where_clause {
        let sql = translate_expression(ctx, &state.cte_columns, predicate)?;
        state.where_parts.push(sql);
    }

    Ok(())
}

fn build_relationship_join(
    ctx: &mut TranslationContext<'_>,
    state: &mut QueryState,
    element: &PatternElement<'_>,
    node_vars: &[String],
    index: usize,
    optional: bool,
) -> Result<()> {
    let relationship = &element.relationships[index];
    let target = &element.nodes[index + 1];
    let source_var = &node_vars[index];
    let target_var = &node_vars[index + 1];

    let source_alias = ctx.alias_for(source_var, NODE_TABLE);
    let target_bound = ctx.has_alias(target_var);

    if relationship.is_variable_length() {
        let target_alias = ctx.alias_for(target_var, NODE_TABLE);
        let cte_name = ctx.next_cte_name("path");
        let generator = VariableLengthCteGenerator::new(
            cte_name,
            relationship,
            source_alias.clone(),
            target_alias.clone(),
            optional,
        );
        let rendered = generator.generate(ctx)?;

        state.cte_parts.push(rendered.cte);
        state.recursive = true;
        state.add_join_for(&source_alias, rendered.start_join, None);
        if target_bound {
            state.where_parts.push(rendered.target_condition);
        } else {
            state.add_join_for(&source_alias, rendered.target_join, Some(&target_alias));
            let filters = node_filters(ctx, target, &target_alias)?;
            state.where_parts.extend(filters);
        }
        return Ok(());
    }

    let rel_var = match relationship.variable {
        Some(variable) => variable.to_string(),
        None => ctx.synth_name("rel"),
    };
    let edge_alias = ctx.alias_for(&rel_var, EDGE_TABLE);
    let join_keyword = if optional { "LEFT JOIN" } else { "JOIN" };

    // Edge constraints: type alternation and inline property equalities.
    let mut edge_conditions: Vec<String> = Vec::new();
    if !relationship.types.is_empty() {
        let mut type_conditions = Vec::new();
        for relation_type in &relationship.types {
            let placeholder = ctx.bind(json!(relation_type));
            type_conditions.push(format!("{}.relation_type = {}", edge_alias, placeholder));
        }
        edge_conditions.push(format!("({})", type_conditions.join(" OR ")));
    }
    if let Some(properties) = &relationship.properties {
        for (key, value_expr) in properties {
            let value = evaluate_literal(ctx, value_expr)?;
            let placeholder = ctx.bind(value);
            edge_conditions.push(format!(
                "{}.properties->>'{}' = {}",
                edge_alias, key, placeholder
            ));
        }
    }

    // Undirected single-hop joins traverse as outgoing; callers wanting the
    // symmetric closure use a variable-length expansion or two patterns.
    let (edge_source_col, edge_target_col) = match relationship.direction {
        Direction::Incoming => ("target_node_uuid", "source_node_uuid"),
        Direction::Outgoing | Direction::Either => ("source_node_uuid", "target_node_uuid"),
    };

    let mut edge_join = format!(
        "{} {} {} ON {}.uuid = {}.{}",
        join_keyword, EDGE_TABLE, edge_alias, source_alias, edge_alias, edge_source_col
    );
    if optional && !edge_conditions.is_empty() {
        edge_join.push_str(&format!(" AND {}", edge_conditions.join(" AND ")));
    }

    if target_bound {
        // The far endpoint equates to the existing alias; re-joining the
        // node table would shadow it.
        let target_alias = ctx.alias_for(target_var, NODE_TABLE);
        let endpoint = format!("{}.{} = {}.uuid", edge_alias, edge_target_col, target_alias);
        if optional {
            edge_join.push_str(&format!(" AND {}", endpoint));
            state.add_join_for(&source_alias, edge_join, Some(&edge_alias));
        } else {
            state.add_join_for(&source_alias, edge_join, Some(&edge_alias));
            state.where_parts.push(endpoint);
        }
        if !optional {
            state.where_parts.extend(edge_conditions);
        }
        return Ok(());
    }

    state.add_join_for(&source_alias, edge_join, Some(&edge_alias));
    if !optional {
        state.where_parts.extend(edge_conditions);
    }

    let target_alias = ctx.alias_for(target_var, NODE_TABLE);
    let mut node_join = format!(
        "{} {} {} ON {}.{} = {}.uuid",
        join_keyword, NODE_TABLE, target_alias, edge_alias, edge_target_col, target_alias
    );
    let filters = node_filters(ctx, target, &target_alias)?;
    if optional {
        if !filters.is_empty() {
            node_join.push_str(&format!(" AND {}", filters.join(" AND ")));
        }
        state.add_join_for(&edge_alias, node_join, Some(&target_alias));
    } else {
        state.add_join_for(&edge_alias, node_join, Some(&target_alias));
        state.where_parts.extend(filters);
    }

    Ok(())
}

/// Label and inline-property predicates for one node pattern. Labels from
/// the reserved set hit `node_type`; custom labels live in metadata.
/// Property values drive the JSONB access form: numbers and booleans cast
/// the `->` access, strings compare the `->>` text, null turns into IS NULL.
pub(crate) fn node_filters(
    ctx: &mut TranslationContext<'_>,
    node: &NodePattern<'_>,
    alias: &str,
) -> Result<Vec<String>> {
    let mut filters = Vec::new();

    if let Some(label) = node.first_label() {
        if schema::is_reserved_node_type(label) {
            let placeholder = ctx.bind(json!(label.to_lowercase()));
            filters.push(format!("{}.node_type = {}", alias, placeholder));
        } else {
            let placeholder = ctx.bind(json!(label));
            filters.push(format!("{}.metadata->>'label' = {}", alias, placeholder));
        }
    }

    if let Some(properties) = &node.properties {
        for (key, value_expr) in properties {
            let value = evaluate_literal(ctx, value_expr)?;
            match &value {
                Value::Number(_) => {
                    let placeholder = ctx.bind(value);
                    filters.push(format!(
                        "({}.properties->'{}')::numeric = {}",
                        alias, key, placeholder
                    ));
                }
                Value::Bool(_) => {
                    let placeholder = ctx.bind(value);
                    filters.push(format!(
                        "({}.properties->'{}')::boolean = {}",
                        alias, key, placeholder
                    ));
                }
                Value::Null => {
                    filters.push(format!("{}.properties->>'{}' IS NULL", alias, key));
                }
                Value::String(_) => {
                    let placeholder = ctx.bind(value);
                    filters.push(format!(
                        "{}.properties->>'{}' = {}",
                        alias, key, placeholder
                    ));
                }
                _ => {
                    let text = to_json_text(&value)?;
                    let placeholder = ctx.bind(Value::String(text));
                    filters.push(format!(
                        "{}.properties->>'{}' = {}",
                        alias, key, placeholder
                    ));
                }
            }
        }
    }

    Ok(filters)
}
