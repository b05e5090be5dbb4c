use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Cypher → PostgreSQL function names, keyed by lowercased Cypher name.
    static ref FUNCTION_MAP: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("count", "COUNT");
        m.insert("sum", "SUM");
        m.insert("avg", "AVG");
        m.insert("min", "MIN");
        m.insert("max", "MAX");
        m.insert("collect", "array_agg");
        m.insert("tolower", "LOWER");
        m.insert("toupper", "UPPER");
        m.insert("size", "array_length");
        m.insert("length", "length");
        m
    };
}

/// Aggregation functions; their presence in a projection triggers GROUP BY.
const AGGREGATE_FUNCTIONS: &[&str] = &["count", "sum", "avg", "min", "max", "collect"];

/// Aggregates whose JSONB text arguments need a `::numeric` coercion.
pub const NUMERIC_AGGREGATES: &[&str] = &["SUM", "AVG", "MIN", "MAX"];

/// Map a Cypher function name to its SQL spelling, case-insensitively.
/// Unmapped names pass through uppercased.
pub fn sql_function_name(name: &str) -> String {
    let lower = name.to_lowercase();
    match FUNCTION_MAP.get(lower.as_str()) {
        Some(mapped) => (*mapped).to_string(),
        None => {
            log::warn!(
                "function '{}' has no SQL mapping, passing through uppercased",
                name
            );
            name.to_uppercase()
        }
    }
}

pub fn is_aggregate(name: &str) -> bool {
    let lower = name.to_lowercase();
    AGGREGATE_FUNCTIONS.contains(&lower.as_str())
}
