use std::collections::HashMap;

use serde_json::Value;

use super::errors::PostgresQueryGeneratorError;

/// Per-call mutable state of one `generate` invocation: the tenant id, the
/// positional parameter buffer, the variable→alias map, and the counters
/// that mint aliases and CTE names. Created fresh for every call; the
/// generator itself stays stateless across calls.
pub struct TranslationContext<'a> {
    group_id: &'a str,
    params: Vec<Value>,
    /// Insertion-ordered so the tenant filter can anchor deterministically.
    aliases: Vec<(String, String)>,
    alias_counter: u32,
    anon_counter: u32,
    cte_counter: u32,
    bindings: &'a HashMap<String, Value>,
    strict_bindings: bool,
}

impl<'a> TranslationContext<'a> {
    pub fn new(
        group_id: &'a str,
        bindings: &'a HashMap<String, Value>,
        strict_bindings: bool,
    ) -> Self {
        TranslationContext {
            group_id,
            params: Vec::new(),
            aliases: Vec::new(),
            alias_counter: 0,
            anon_counter: 0,
            cte_counter: 0,
            bindings,
            strict_bindings,
        }
    }

    pub fn group_id(&self) -> &str {
        self.group_id
    }

    /// Append a parameter and return its 1-based positional placeholder.
    pub fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    /// Get or create the table alias for a query variable. First-seen wins;
    /// the alias is the table's first character plus a monotonic counter.
    pub fn alias_for(&mut self, variable: &str, table: &str) -> String {
        if let Some(alias) = self.lookup_alias(variable) {
            return alias.to_string();
        }
        self.alias_counter += 1;
        let initial = table.chars().next().unwrap_or('g');
        let alias = format!("{}{}", initial, self.alias_counter);
        self.aliases.push((variable.to_string(), alias.clone()));
        alias
    }

    pub fn lookup_alias(&self, variable: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, alias)| alias.as_str())
    }

    pub fn has_alias(&self, variable: &str) -> bool {
        self.lookup_alias(variable).is_some()
    }

    /// Synthesize a name for an anonymous node or relationship so it can
    /// hold an alias like any named variable.
    pub fn synth_name(&mut self, kind: &str) -> String {
        self.anon_counter += 1;
        format!("_{}_{}", kind, self.anon_counter)
    }

    /// Mint the next CTE identifier (`cte_1`, `path_2`, …). One counter
    /// serves both prefixes so names never collide within a statement.
    pub fn next_cte_name(&mut self, prefix: &str) -> String {
        self.cte_counter += 1;
        format!("{}_{}", prefix, self.cte_counter)
    }

    /// Resolve a `$name` binding. Missing bindings become SQL NULL unless
    /// strict mode was selected at construction.
    pub fn binding(&self, name: &str) -> Result<Value, PostgresQueryGeneratorError> {
        match self.bindings.get(name) {
            Some(value) => Ok(value.clone()),
            None if self.strict_bindings => {
                Err(PostgresQueryGeneratorError::MissingParameter(name.to_string()))
            }
            None => {
                log::warn!("no binding supplied for parameter ${}, using NULL", name);
                Ok(Value::Null)
            }
        }
    }

    /// Clear the per-branch scope between UNION branches. The parameter
    /// buffer keeps growing so placeholders stay globally consistent.
    pub fn reset_scope(&mut self) {
        self.aliases.clear();
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }

    #[cfg(test)]
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}
