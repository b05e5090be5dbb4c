//! End-to-end translation suite: scenarios, universal properties, and
//! mutation lowering, all driven through the public `Translator` facade.

use std::collections::HashMap;

use cyphergres::Translator;
use serde_json::Value;

mod mutation_tests;
mod property_tests;
mod scenario_tests;

pub const TENANT: &str = "tenant-1";

pub fn translate(query: &str) -> (String, Vec<Value>) {
    translate_with(query, &HashMap::new())
}

pub fn translate_with(query: &str, bindings: &HashMap<String, Value>) -> (String, Vec<Value>) {
    let _ = env_logger::builder().is_test(true).try_init();
    Translator::new(TENANT)
        .translate(query, bindings)
        .unwrap_or_else(|e| panic!("query should translate, got {e}: {query}"))
}

/// Every `$n` placeholder index appearing in the SQL text, in order.
pub fn placeholder_indexes(sql: &str) -> Vec<usize> {
    let bytes = sql.as_bytes();
    let mut indexes = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 {
                if let Ok(n) = sql[i + 1..j].parse::<usize>() {
                    indexes.push(n);
                }
            }
            i = j;
        } else {
            i += 1;
        }
    }
    indexes
}
