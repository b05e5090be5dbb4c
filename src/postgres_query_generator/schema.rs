//! The fixed two-table backing schema the generator targets.

pub const NODE_TABLE: &str = "graph_nodes";
pub const EDGE_TABLE: &str = "graph_edges";

/// Top-level columns of `graph_nodes`. A property reference matching one of
/// these compiles to a column access instead of a JSONB lookup.
pub const NODE_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "node_type",
    "group_id",
    "created_at",
    "valid_at",
    "invalid_at",
    "embedding",
    "summary",
    "metadata",
];

/// Top-level columns of `graph_edges`.
pub const EDGE_COLUMNS: &[&str] = &[
    "uuid",
    "source_node_uuid",
    "target_node_uuid",
    "relation_type",
    "created_at",
    "valid_at",
    "invalid_at",
    "group_id",
    "fact",
    "episodes",
    "metadata",
];

/// Labels stored in `node_type`; anything else lands in `metadata->>'label'`.
pub const RESERVED_NODE_TYPES: &[&str] = &["entity", "episode", "community"];

pub fn is_known_column(name: &str) -> bool {
    NODE_COLUMNS.contains(&name) || EDGE_COLUMNS.contains(&name)
}

pub fn is_reserved_node_type(label: &str) -> bool {
    let lower = label.to_lowercase();
    RESERVED_NODE_TYPES.contains(&lower.as_str())
}
