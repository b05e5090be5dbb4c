use serde_json::json;
use std::collections::HashMap;
use test_case::test_case;

use cyphergres::{TranslateError, Translator};

use super::{placeholder_indexes, translate, translate_with, TENANT};

const QUERIES: &[&str] = &[
    "MATCH (n:Entity) RETURN n",
    "MATCH (a:Entity)-[r:KNOWS]->(b:Entity) RETURN a, b",
    "MATCH (a)-[:REL*2..4]->(b) RETURN a, b",
    "MATCH (n:Entity) WHERE n.age > 30 RETURN n.name AS name",
    "MATCH (n:Entity) RETURN n.city AS city, COUNT(n) AS c ORDER BY c DESC",
    "MATCH (n:Entity) RETURN n UNION ALL MATCH (n:Entity) RETURN n",
    "MATCH (n:Entity {name: 'Ada'}) WITH n.city AS city, count(n) AS c WHERE c > 1 RETURN city",
    "MATCH (n {name: 'Andres'}) DETACH DELETE n",
    "CREATE (n:Entity {name: 'Widget', age: 3})",
    "MERGE (n:Entity {name: 'W'}) ON CREATE SET n.v = 1 ON MATCH SET n.seen = 2",
];

#[test]
fn determinism_repeated_translation_is_identical() {
    for query in QUERIES {
        let first = translate(query);
        let second = translate(query);
        assert_eq!(first, second, "translation must be deterministic: {query}");
    }
}

#[test]
fn placeholder_consistency_no_gaps() {
    for query in QUERIES {
        let (sql, params) = translate(query);
        let indexes = placeholder_indexes(&sql);
        let highest = indexes.iter().copied().max().unwrap_or(0);
        assert_eq!(
            highest,
            params.len(),
            "highest placeholder must equal parameter count: {query}\n{sql}"
        );
        for i in 1..=params.len() {
            assert!(
                indexes.contains(&i),
                "placeholder ${i} missing from SQL: {query}\n{sql}"
            );
        }
    }
}

#[test]
fn tenant_scoping_every_table_read_is_filtered() {
    for query in QUERIES {
        let (sql, params) = translate(query);
        if sql.contains("FROM graph_nodes") || sql.contains("FROM graph_edges") {
            assert!(
                sql.contains(".group_id = $"),
                "missing tenant filter: {query}\n{sql}"
            );
            assert!(
                params.iter().any(|p| p == &json!(TENANT)),
                "tenant id must be bound: {query}"
            );
        }
    }
}

#[test]
fn alias_stability_same_variable_same_alias() {
    let (sql, _) = translate("MATCH (a:Entity)-[r:X]->(b) MATCH (a)-[s:Y]->(c) RETURN a");
    // Both relationship joins anchor on a's alias.
    assert!(sql.contains("JOIN graph_edges g2 ON g1.uuid = g2.source_node_uuid"));
    assert!(sql.contains("JOIN graph_edges g4 ON g1.uuid = g4.source_node_uuid"));
}

#[test_case("MATCH (n:Entity) WHERE n.age > 30 AND n.active = true RETURN n", "30" ; "integer and boolean inline")]
#[test_case("MATCH (n) WHERE n.score = 1.5 RETURN n", "1.5" ; "float inline")]
fn numeric_literals_appear_verbatim(query: &str, literal: &str) {
    let (sql, _) = translate(query);
    assert!(sql.contains(literal), "literal {literal} not in SQL:\n{sql}");
}

#[test]
fn boolean_and_null_literals_appear_verbatim() {
    let (sql, _) = translate("MATCH (n) WHERE n.active = true RETURN n");
    assert!(sql.contains("TRUE"));
    let (sql, _) = translate("MATCH (n) RETURN CASE WHEN n.x IS NULL THEN null ELSE 1 END AS v");
    assert!(sql.contains("NULL"));
}

#[test]
fn string_literals_travel_as_parameters() {
    let (sql, params) = translate("MATCH (n:Entity) WHERE n.city = 'Oslo' RETURN n");
    assert!(!sql.contains("Oslo"), "string literal must not be inlined");
    assert!(params.contains(&json!("Oslo")));
}

#[test]
fn map_literals_travel_as_json_strings() {
    let (sql, params) = translate("MATCH (n {name: 'x'}) SET n += {age: 31, city: 'Oslo'}");
    assert!(sql.contains("properties = properties || "));
    assert!(params.contains(&json!(r#"{"age":31,"city":"Oslo"}"#)));
}

#[test]
fn direction_fidelity_outgoing() {
    let (sql, _) = translate("MATCH (a)-[r:X]->(b) RETURN a");
    assert!(sql.contains("ON g1.uuid = g2.source_node_uuid"));
    assert!(sql.contains("ON g2.target_node_uuid = g3.uuid"));
}

#[test]
fn direction_fidelity_incoming() {
    let (sql, _) = translate("MATCH (a)<-[r:X]-(b) RETURN a");
    assert!(sql.contains("ON g1.uuid = g2.target_node_uuid"));
    assert!(sql.contains("ON g2.source_node_uuid = g3.uuid"));
}

#[test_case("MATCH (a)-[:R*]->(b) RETURN a", 1, 999 ; "unbounded star")]
#[test_case("MATCH (a)-[:R*3]->(b) RETURN a", 3, 3 ; "fixed hops")]
#[test_case("MATCH (a)-[:R*2..]->(b) RETURN a", 2, 999 ; "lower bound only")]
#[test_case("MATCH (a)-[:R*..5]->(b) RETURN a", 1, 5 ; "upper bound only")]
#[test_case("MATCH (a)-[:R*2..6]->(b) RETURN a", 2, 6 ; "both bounds")]
fn hop_bounds_render_in_cte_and_outer_filter(query: &str, min: u32, max: u32) {
    let (sql, _) = translate(query);
    assert!(sql.contains("WITH RECURSIVE path_1 AS ("), "missing CTE:\n{sql}");
    assert!(
        sql.contains(&format!("WHERE p.depth < {max}")),
        "missing recursion guard:\n{sql}"
    );
    assert!(
        sql.contains(&format!("path_1.depth >= {min}")),
        "missing outer depth filter:\n{sql}"
    );
}

#[test]
fn aggregation_grouping_lists_exactly_plain_projections() {
    let (sql, _) = translate(
        "MATCH (n:Entity) RETURN n.city AS city, n.country AS country, count(n) AS c",
    );
    assert!(sql.contains("GROUP BY g1.properties->>'city', g1.properties->>'country'"));
}

#[test]
fn no_grouping_without_aggregation() {
    let (sql, _) = translate("MATCH (n:Entity) RETURN n.city AS city");
    assert!(!sql.contains("GROUP BY"));
}

#[test]
fn no_grouping_when_everything_aggregates() {
    let (sql, _) = translate("MATCH (n:Entity) RETURN count(n) AS c");
    assert!(!sql.contains("GROUP BY"));
}

#[test]
fn having_expands_aliases_of_aggregate_items() {
    let (sql, _) = translate(
        "MATCH (n:Entity) WITH n.city AS city, sum(n.age) AS total WHERE total >= 10 RETURN city",
    );
    assert!(sql.contains("HAVING (SUM((g1.properties->'age')::numeric) >= 10)"));
    assert!(
        !sql.contains("HAVING (total"),
        "HAVING must not reference the SELECT alias"
    );
}

#[test]
fn missing_binding_defaults_to_null_parameter() {
    let (sql, params) = translate_with("MATCH (n) WHERE n.uuid = $id RETURN n", &HashMap::new());
    assert!(sql.contains("(g1.uuid = $2)"));
    assert_eq!(params[1], serde_json::Value::Null);
}

#[test]
fn strict_bindings_surface_missing_parameter() {
    let translator = Translator::new(TENANT).with_strict_bindings(true);
    let err = translator
        .translate("MATCH (n) WHERE n.uuid = $id RETURN n", &HashMap::new())
        .expect_err("strict mode must reject missing bindings");
    assert!(matches!(err, TranslateError::Translation(_)));
}

#[test]
fn syntax_errors_report_position_not_partial_sql() {
    let err = Translator::new(TENANT)
        .translate("MATCH (n:Entity RETURN n", &HashMap::new())
        .expect_err("unclosed node pattern must fail");
    assert!(matches!(err, TranslateError::Syntax { .. }));
}

#[test]
fn unsupported_expressions_fail_with_translation_error() {
    let err = Translator::new(TENANT)
        .translate(
            "MATCH (n) RETURN [x IN n.items WHERE x > 0 | x] AS xs",
            &HashMap::new(),
        )
        .expect_err("list comprehensions do not lower");
    assert!(matches!(err, TranslateError::Translation(_)));
}
