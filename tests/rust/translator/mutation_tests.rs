use serde_json::json;

use super::{translate, translate_with, TENANT};

#[test]
fn create_node_inserts_with_generated_uuid() {
    let (sql, params) = translate("CREATE (n:Entity {name: 'Widget', age: 3})");

    assert!(sql.starts_with("INSERT INTO graph_nodes (uuid, name, node_type, group_id, properties, valid_at)"));
    assert!(sql.contains("gen_random_uuid()"));
    assert!(sql.contains("CURRENT_TIMESTAMP"));
    assert!(sql.contains("RETURNING uuid, name, node_type, properties"));
    assert_eq!(
        params,
        vec![
            json!("Widget"),
            json!("entity"),
            json!(TENANT),
            json!(r#"{"name":"Widget","age":3}"#),
        ]
    );
}

#[test]
fn create_custom_label_defaults_node_type_to_entity() {
    let (_, params) = translate("CREATE (p:Person {name: 'Ada'})");
    assert_eq!(params[1], json!("entity"));
}

#[test]
fn create_reserved_label_lowercases_node_type() {
    let (_, params) = translate("CREATE (e:Episode {name: 'ep'})");
    assert_eq!(params[1], json!("episode"));
}

#[test]
fn create_without_name_binds_empty_string() {
    let (_, params) = translate("CREATE (n:Entity {kind: 'x'})");
    assert_eq!(params[0], json!(""));
}

#[test]
fn create_relationship_pattern_is_rejected() {
    let result = cyphergres::Translator::new(TENANT).translate(
        "CREATE (a)-[r:REL]->(b)",
        &std::collections::HashMap::new(),
    );
    assert!(result.is_err(), "relationship CREATE must not lower");
}

#[test]
fn merge_upserts_on_uuid_conflict() {
    let (sql, params) = translate("MERGE (n:Entity {name: 'W'})");

    assert!(sql.contains("ON CONFLICT (uuid) DO UPDATE SET"));
    assert!(sql.contains("name = EXCLUDED.name"));
    assert!(sql.contains("properties = EXCLUDED.properties"));
    assert!(sql.contains("valid_at = CURRENT_TIMESTAMP"));
    assert!(sql.contains("RETURNING uuid, name, node_type"));
    assert_eq!(params[0], json!("W"));
}

#[test]
fn merge_on_create_folds_into_inserted_properties() {
    let (_, params) = translate("MERGE (n:Entity {name: 'W'}) ON CREATE SET n.v = 1");
    assert_eq!(params[3], json!(r#"{"name":"W","v":1}"#));
}

#[test]
fn merge_on_match_stacks_jsonb_set_over_excluded() {
    let (sql, params) =
        translate("MERGE (n:Entity {name: 'W'}) ON MATCH SET n.seen = 2");
    assert!(sql.contains("properties = jsonb_set(EXCLUDED.properties, '{seen}', $5::jsonb)"));
    assert_eq!(params[4], json!("2"));
}

#[test]
fn delete_scopes_through_match_subquery() {
    let (sql, params) = translate("MATCH (n:Entity {name: 'x'}) DELETE n");

    assert!(sql.starts_with("DELETE FROM graph_nodes WHERE uuid IN (SELECT g1.uuid FROM graph_nodes g1"));
    assert!(sql.contains("g1.node_type = $1"));
    assert!(sql.contains("g1.properties->>'name' = $2"));
    assert!(sql.contains("g1.group_id = $3"));
    assert_eq!(params, vec![json!("entity"), json!("x"), json!(TENANT)]);
}

#[test]
fn detach_delete_removes_edges_from_both_endpoints_first() {
    let (sql, _) = translate("MATCH (n {name: 'Andres'}) DETACH DELETE n");

    let statements: Vec<&str> = sql.split(";\n").collect();
    assert_eq!(statements.len(), 2);
    assert!(statements[0].starts_with("DELETE FROM graph_edges"));
    assert!(statements[0].contains("source_node_uuid IN ("));
    assert!(statements[0].contains("target_node_uuid IN ("));
    assert!(statements[1].starts_with("DELETE FROM graph_nodes WHERE uuid IN ("));
}

#[test]
fn delete_carries_relationship_joins_into_subquery() {
    let (sql, _) = translate("MATCH (a:Entity)-[r:OWNS]->(b) DELETE b");
    assert!(sql.contains("SELECT g3.uuid FROM graph_nodes g1"));
    assert!(sql.contains("JOIN graph_edges g2 ON g1.uuid = g2.source_node_uuid"));
}

#[test]
fn set_property_updates_with_jsonb_set() {
    let (sql, params) = translate("MATCH (n {name: 'Andres'}) SET n.age = 31");

    assert!(sql.starts_with("UPDATE graph_nodes SET properties = jsonb_set(properties, '{age}', $3::jsonb)"));
    assert!(sql.contains("WHERE uuid IN (SELECT g1.uuid FROM graph_nodes g1"));
    assert_eq!(params, vec![json!("Andres"), json!(TENANT), json!("31")]);
}

#[test]
fn set_merge_properties_concatenates_jsonb() {
    let (sql, _) = translate("MATCH (n {name: 'x'}) SET n += {age: 31}");
    assert!(sql.contains("SET properties = properties || $3::jsonb"));
}

#[test]
fn set_whole_bag_replaces_properties() {
    let mut bindings = std::collections::HashMap::new();
    bindings.insert("props".to_string(), json!({"a": 1}));
    let (sql, params) = translate_with("MATCH (n {name: 'x'}) SET n = $props", &bindings);
    assert!(sql.contains("SET properties = $3::jsonb"));
    assert_eq!(params[2], json!(r#"{"a":1}"#));
}

#[test]
fn set_label_updates_metadata() {
    let (sql, params) = translate("MATCH (n {name: 'x'}) SET n:Archived");
    assert!(sql.contains("SET metadata = jsonb_set(metadata, '{label}', $3::jsonb)"));
    assert_eq!(params[2], json!(r#""Archived""#));
}

#[test]
fn remove_property_deletes_jsonb_key() {
    let (sql, _) = translate("MATCH (n {name: 'x'}) REMOVE n.age, n.address");
    assert!(sql.contains("SET properties = properties - 'age' - 'address'"));
    assert!(sql.contains("WHERE uuid IN (SELECT g1.uuid"));
}

#[test]
fn remove_label_deletes_metadata_key() {
    let (sql, _) = translate("MATCH (n {name: 'x'}) REMOVE n:Archived");
    assert!(sql.contains("SET metadata = metadata - 'label'"));
}

#[test]
fn set_on_unbound_variable_errors() {
    let result = cyphergres::Translator::new(TENANT)
        .translate("SET n.age = 1", &std::collections::HashMap::new());
    assert!(result.is_err(), "SET without a binding MATCH must fail");
}
