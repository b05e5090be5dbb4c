use serde_json::json;

use super::{translate, TENANT};

#[test]
fn simple_match_by_label() {
    let (sql, params) = translate("MATCH (n:Entity) RETURN n");
    assert_eq!(
        sql,
        "SELECT row_to_json(g1.*) AS n\n\
         FROM graph_nodes g1\n\
         WHERE g1.node_type = $1 AND g1.group_id = $2"
    );
    assert_eq!(params, vec![json!("entity"), json!(TENANT)]);
}

#[test]
fn relationship_match_joins_edges_and_target() {
    let (sql, params) = translate("MATCH (a:Entity)-[r:KNOWS]->(b:Entity) RETURN a, b");

    assert!(sql.contains("FROM graph_nodes g1"));
    assert!(sql.contains("JOIN graph_edges g2 ON g1.uuid = g2.source_node_uuid"));
    assert!(sql.contains("JOIN graph_nodes g3 ON g2.target_node_uuid = g3.uuid"));
    assert!(sql.contains("(g2.relation_type = $2)"));
    assert!(sql.contains("row_to_json(g1.*) AS a"));
    assert!(sql.contains("row_to_json(g3.*) AS b"));
    assert_eq!(
        params,
        vec![json!("entity"), json!("KNOWS"), json!("entity"), json!(TENANT)]
    );
}

#[test]
fn variable_length_match_emits_recursive_cte() {
    let (sql, params) = translate("MATCH (a)-[:REL*2..4]->(b) RETURN a, b");

    assert!(sql.starts_with("WITH RECURSIVE path_1 AS ("));
    assert!(sql.contains("1 AS depth"));
    assert!(sql.contains("ARRAY[uuid] AS path_edges"));
    assert!(sql.contains("WHERE (relation_type = $1)"));
    assert!(sql.contains("p.depth + 1"));
    assert!(sql.contains("WHERE p.depth < 4"));
    assert!(sql.contains("AND NOT e.uuid = ANY(p.path_edges)"));
    assert!(sql.contains("JOIN path_1 ON g1.uuid = path_1.start_id AND path_1.depth >= 2"));
    assert!(sql.contains("JOIN graph_nodes g2 ON g2.uuid = path_1.end_id"));
    assert_eq!(params, vec![json!("REL"), json!(TENANT)]);
}

#[test]
fn numeric_predicate_coerces_jsonb_and_projects_property() {
    let (sql, params) = translate("MATCH (n:Entity) WHERE n.age > 30 RETURN n.name AS name");

    assert!(sql.contains("((g1.properties->'age')::numeric > 30)"));
    // `name` is a known column on graph_nodes, so no JSONB lookup.
    assert!(sql.contains("g1.name AS name"));
    assert_eq!(params, vec![json!("entity"), json!(TENANT)]);
}

#[test]
fn custom_property_projection_uses_jsonb() {
    let (sql, _) = translate("MATCH (n:Entity) RETURN n.city AS city");
    assert!(sql.contains("g1.properties->>'city' AS city"));
}

#[test]
fn aggregation_groups_by_plain_projections() {
    let (sql, _) =
        translate("MATCH (n:Entity) RETURN n.city AS city, COUNT(n) AS c ORDER BY c DESC");

    assert!(sql.contains("COUNT(g1.*) AS c"));
    assert!(sql.contains("g1.properties->>'city' AS city"));
    assert!(sql.contains("GROUP BY g1.properties->>'city'"));
    assert!(sql.contains("ORDER BY c DESC"));
}

#[test]
fn union_all_renders_parenthesized_branches() {
    let (sql, params) =
        translate("MATCH (n:Entity) RETURN n UNION ALL MATCH (n:Entity) RETURN n");

    let branches: Vec<&str> = sql.split("\nUNION ALL\n").collect();
    assert_eq!(branches.len(), 2);
    for branch in &branches {
        assert!(branch.starts_with('('));
        assert!(branch.ends_with(')'));
        assert!(branch.contains("FROM graph_nodes"));
        assert!(branch.contains("row_to_json"));
    }
    // Branch parameters concatenate in order.
    assert_eq!(
        params,
        vec![json!("entity"), json!(TENANT), json!("entity"), json!(TENANT)]
    );
    // Both branches carry their own tenant filter.
    assert!(branches[0].contains("group_id = $2"));
    assert!(branches[1].contains("group_id = $4"));
}

#[test]
fn union_distinct_uses_plain_union() {
    let (sql, _) = translate("MATCH (a) RETURN a UNION MATCH (b) RETURN b");
    assert!(sql.contains("\nUNION\n"));
    assert!(!sql.contains("UNION ALL"));
}

#[test]
fn with_clause_compiles_to_cte() {
    let (sql, _) = translate("MATCH (n:Entity) WITH n RETURN n.name AS name");

    assert!(sql.starts_with("WITH cte_1 AS (SELECT row_to_json(g1.*) AS n"));
    assert!(sql.contains("FROM cte_1"));
    // After the CTE, the node lives as JSONB: property access goes ->>.
    assert!(sql.contains("n->>'name' AS name"));
}

#[test]
fn with_where_becomes_having_with_expanded_alias() {
    let (sql, _) = translate(
        "MATCH (n:Entity) WITH n.city AS city, count(n) AS c WHERE c > 5 RETURN city",
    );

    assert!(sql.contains("GROUP BY g1.properties->>'city'"));
    // HAVING cannot reference the SELECT alias `c`.
    assert!(sql.contains("HAVING (COUNT(g1.*) > 5)"));
    assert!(sql.contains("FROM cte_1"));
    assert!(sql.trim_end().ends_with("SELECT city\nFROM cte_1"));
}

#[test]
fn optional_match_uses_left_joins_with_on_constraints() {
    let (sql, _) =
        translate("MATCH (a:Entity) OPTIONAL MATCH (a)-[r:KNOWS]->(b) RETURN a, b");

    assert!(sql.contains(
        "LEFT JOIN graph_edges g2 ON g1.uuid = g2.source_node_uuid AND (g2.relation_type = $3)"
    ));
    assert!(sql.contains("LEFT JOIN graph_nodes g3 ON g2.target_node_uuid = g3.uuid"));
    // The type constraint must not leak into WHERE, or the LEFT JOIN
    // degenerates to an inner join.
    let where_clause = sql.split("\nWHERE ").nth(1).expect("has WHERE");
    assert!(!where_clause.contains("relation_type"));
}

#[test]
fn incoming_relationship_swaps_join_columns() {
    let (sql, _) = translate("MATCH (a:Entity)<-[r:DIRECTED]-(b:Entity) RETURN a, b");
    assert!(sql.contains("JOIN graph_edges g2 ON g1.uuid = g2.target_node_uuid"));
    assert!(sql.contains("JOIN graph_nodes g3 ON g2.source_node_uuid = g3.uuid"));
}

#[test]
fn undirected_single_hop_traverses_as_outgoing() {
    let (sql, _) = translate("MATCH (a)-[r:LINKS]-(b) RETURN a, b");
    assert!(sql.contains("JOIN graph_edges g2 ON g1.uuid = g2.source_node_uuid"));
}

#[test]
fn inline_properties_filter_with_typed_casts() {
    let (sql, params) =
        translate("MATCH (n:Entity {name: 'Ada', age: 36, active: true}) RETURN n");

    assert!(sql.contains("g1.properties->>'name' = $2"));
    assert!(sql.contains("(g1.properties->'age')::numeric = $3"));
    assert!(sql.contains("(g1.properties->'active')::boolean = $4"));
    assert_eq!(
        params,
        vec![
            json!("entity"),
            json!("Ada"),
            json!(36),
            json!(true),
            json!(TENANT)
        ]
    );
}

#[test]
fn custom_label_filters_metadata() {
    let (sql, params) = translate("MATCH (p:Person) RETURN p");
    assert!(sql.contains("g1.metadata->>'label' = $1"));
    assert_eq!(params, vec![json!("Person"), json!(TENANT)]);
}

#[test]
fn skip_and_limit_render_offset_and_limit() {
    let (sql, _) = translate("MATCH (n:Entity) RETURN n SKIP 5 LIMIT 10");
    assert!(sql.contains("OFFSET 5"));
    assert!(sql.contains("LIMIT 10"));
}

#[test]
fn distinct_propagates_to_select() {
    let (sql, _) = translate("MATCH (n:Entity) RETURN DISTINCT n.city AS city");
    assert!(sql.contains("SELECT DISTINCT g1.properties->>'city' AS city"));
}

#[test]
fn string_predicates_lower_to_like_and_regex() {
    let (sql, _) = translate(
        "MATCH (n:Entity) WHERE n.city STARTS WITH 'O' AND n.city ENDS WITH 'o' \
         AND n.city CONTAINS 'sl' AND n.city =~ 'O.*' RETURN n",
    );
    // The WHERE predicate binds after the label ($1) and tenant ($2).
    assert!(sql.contains("g1.properties->>'city' LIKE $3 || '%'"));
    assert!(sql.contains("g1.properties->>'city' LIKE '%' || $4"));
    assert!(sql.contains("g1.properties->>'city' LIKE '%' || $5 || '%'"));
    assert!(sql.contains("g1.properties->>'city' ~ $6"));
}

#[test]
fn in_list_lowers_to_any() {
    let (sql, params) = translate("MATCH (n:Entity) WHERE n.city IN ['Oslo', 'Bergen'] RETURN n");
    assert!(sql.contains("g1.properties->>'city' = ANY(ARRAY[$3, $4])"));
    assert_eq!(params[2], json!("Oslo"));
    assert_eq!(params[3], json!("Bergen"));
}

#[test]
fn multiple_match_clauses_share_bound_variables() {
    let (sql, _) = translate("MATCH (a:Entity)-[r:X]->(b) MATCH (b)-[s:Y]->(c) RETURN a, c");

    // b keeps its alias; the second MATCH contributes joins only.
    let from_count = sql.matches("FROM graph_nodes").count();
    assert_eq!(from_count, 1, "bound variables must not re-enter FROM:\n{sql}");
    assert!(sql.contains("JOIN graph_edges g4 ON g3.uuid = g4.source_node_uuid"));
}

#[test]
fn parameters_resolve_through_bindings() {
    let mut bindings = std::collections::HashMap::new();
    bindings.insert("id".to_string(), json!("abc-123"));
    let (sql, params) =
        super::translate_with("MATCH (n) WHERE n.uuid = $id RETURN n", &bindings);
    assert!(sql.contains("(g1.uuid = $2)"));
    assert_eq!(params, vec![json!(TENANT), json!("abc-123")]);
}

#[test]
fn case_expression_renders_case_when() {
    let (sql, _) = translate(
        "MATCH (n:Entity) RETURN CASE WHEN n.age > 30 THEN 'old' ELSE 'young' END AS bucket",
    );
    assert!(sql.contains(
        "CASE WHEN ((g1.properties->'age')::numeric > 30) THEN $3 ELSE $4 END AS bucket"
    ));
}

#[test]
fn function_mapping_applies() {
    let (sql, _) = translate("MATCH (n:Entity) RETURN toLower(n.name) AS lower, collect(n.city) AS cities");
    assert!(sql.contains("LOWER(g1.name) AS lower"));
    assert!(sql.contains("array_agg(g1.properties->>'city') AS cities"));
}

#[test]
fn sum_of_jsonb_property_coerces_numeric() {
    let (sql, _) = translate("MATCH (n:Entity) RETURN SUM(n.age) AS total");
    assert!(sql.contains("SUM((g1.properties->'age')::numeric) AS total"));
}
