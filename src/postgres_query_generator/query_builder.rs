use std::collections::HashMap;

use crate::cypher_parser::ast::{Clause, Expression, Projection, Query, ReturnClause, SortItem, WithClause};

use super::context::TranslationContext;
use super::errors::PostgresQueryGeneratorError;
use super::expression::{
    contains_aggregation, cte_column, translate_expression, translate_having, AliasMap,
    CteColumns,
};
use super::{match_builder, mutations};

type Result<T> = std::result::Result<T, PostgresQueryGeneratorError>;

/// One FROM entry plus the join tree hanging off it. Entries render
/// comma-separated (cartesian product between disconnected patterns); joins
/// stay attached to the entry that introduced their source alias so the ON
/// clauses only reference tables in their own tree.
pub(crate) struct FromBlock {
    entry: String,
    joins: Vec<String>,
}

/// Accumulated per-branch state while walking a query's clauses.
#[derive(Default)]
pub(crate) struct QueryState {
    pub cte_parts: Vec<String>,
    pub recursive: bool,
    pub where_parts: Vec<String>,
    /// Variable/alias → column scope of the active WITH CTE.
    pub cte_columns: Vec<(String, String)>,
    pub selecting_from_cte: bool,
    blocks: Vec<FromBlock>,
    alias_blocks: HashMap<String, usize>,
}

impl QueryState {
    pub fn has_from(&self) -> bool {
        !self.blocks.is_empty()
    }

    pub fn add_block(&mut self, entry: String, alias: Option<&str>) {
        self.blocks.push(FromBlock {
            entry,
            joins: Vec::new(),
        });
        if let Some(alias) = alias {
            self.alias_blocks
                .insert(alias.to_string(), self.blocks.len() - 1);
        }
    }

    /// Attach a join to the block owning `source_alias` and register any
    /// alias the join introduces against the same block.
    pub fn add_join_for(&mut self, source_alias: &str, join: String, introduces: Option<&str>) {
        if self.blocks.is_empty() {
            self.blocks.push(FromBlock {
                entry: join,
                joins: Vec::new(),
            });
            if let Some(alias) = introduces {
                self.alias_blocks.insert(alias.to_string(), 0);
            }
            return;
        }
        let index = self
            .alias_blocks
            .get(source_alias)
            .copied()
            .unwrap_or(self.blocks.len() - 1);
        self.blocks[index].joins.push(join);
        if let Some(alias) = introduces {
            self.alias_blocks.insert(alias.to_string(), index);
        }
    }

    /// Attach a join to the most recent block (OPTIONAL MATCH opening a new
    /// chain off whatever came before).
    pub fn add_join_to_last(&mut self, join: String, introduces: &str) {
        if self.blocks.is_empty() {
            self.add_block(join, Some(introduces));
            return;
        }
        let index = self.blocks.len() - 1;
        self.blocks[index].joins.push(join);
        self.alias_blocks.insert(introduces.to_string(), index);
    }

    pub fn from_clause(&self) -> Option<String> {
        if self.blocks.is_empty() {
            return None;
        }
        let rendered: Vec<String> = self
            .blocks
            .iter()
            .map(|block| {
                if block.joins.is_empty() {
                    block.entry.clone()
                } else {
                    format!("{}\n{}", block.entry, block.joins.join("\n"))
                }
            })
            .collect();
        Some(rendered.join(",\n"))
    }

    /// After a WITH compiles into a CTE, subsequent clauses select from it.
    pub fn begin_cte_scope(&mut self, cte_name: String, columns: Vec<(String, String)>) {
        self.blocks.clear();
        self.alias_blocks.clear();
        self.where_parts.clear();
        self.blocks.push(FromBlock {
            entry: cte_name,
            joins: Vec::new(),
        });
        self.cte_columns = columns;
        self.selecting_from_cte = true;
    }
}

/// Entry point: the top-level query plus parenthesized UNION branches.
pub(crate) fn build_statement(
    ctx: &mut TranslationContext<'_>,
    query: &Query<'_>,
) -> Result<String> {
    let first = build_query(ctx, query)?;
    if query.unions.is_empty() {
        return Ok(first);
    }

    let mut branches = vec![first];
    for union_query in &query.unions {
        // Each branch is its own scope; the parameter buffer carries on.
        ctx.reset_scope();
        branches.push(build_query(ctx, union_query)?);
    }

    let keyword = if query.union_all { "UNION ALL" } else { "UNION" };
    let separator = format!("\n{}\n", keyword);
    let wrapped: Vec<String> = branches.into_iter().map(|b| format!("({})", b)).collect();
    Ok(wrapped.join(&separator))
}

fn build_query(ctx: &mut TranslationContext<'_>, query: &Query<'_>) -> Result<String> {
    let mut state = QueryState::default();
    let mut return_clause: Option<&ReturnClause<'_>> = None;

    for clause in &query.clauses {
        match clause {
            Clause::Match(m) => match_builder::build_match(ctx, &mut state, m)?,
            Clause::With(w) => build_with(ctx, &mut state, w)?,
            Clause::Return(r) => return_clause = Some(r),
            Clause::Create(c) => {
                let sql = mutations::build_create(ctx, c)?;
                return Ok(finish(&state, sql));
            }
            Clause::Merge(m) => {
                let sql = mutations::build_merge(ctx, m)?;
                return Ok(finish(&state, sql));
            }
            Clause::Delete(d) => {
                let sql = mutations::build_delete(ctx, &state, d)?;
                return Ok(finish(&state, sql));
            }
            Clause::Set(s) => {
                let sql = mutations::build_set(ctx, &state, s)?;
                return Ok(finish(&state, sql));
            }
            Clause::Remove(r) => {
                let sql = mutations::build_remove(ctx, &state, r)?;
                return Ok(finish(&state, sql));
            }
            Clause::Call(_) => {
                return Err(PostgresQueryGeneratorError::UnsupportedClause("CALL … YIELD"))
            }
        }
    }

    let Some(ret) = return_clause else {
        return Err(PostgresQueryGeneratorError::EmptyQuery);
    };
    let select = build_return(ctx, &state, ret)?;
    Ok(finish(&state, select))
}

/// Prefix the statement's CTE list, if any.
fn finish(state: &QueryState, body: String) -> String {
    if state.cte_parts.is_empty() {
        return body;
    }
    let keyword = if state.recursive {
        "WITH RECURSIVE "
    } else {
        "WITH "
    };
    format!("{}{}\n{}", keyword, state.cte_parts.join(",\n"), body)
}

/// WITH compiles the accumulated match context into a named CTE and records
/// the projected column scope for the clauses that follow.
fn build_with(
    ctx: &mut TranslationContext<'_>,
    state: &mut QueryState,
    with: &WithClause<'_>,
) -> Result<()> {
    let scope = state.cte_columns.clone();
    let mut select_items = Vec::new();
    let mut columns: Vec<(String, String)> = Vec::new();
    let mut alias_map: AliasMap<'_, '_> = HashMap::new();
    let mut has_aggregation = false;
    let mut plain_expressions = Vec::new();

    for item in &with.items {
        select_items.push(render_projection(ctx, &scope, item)?);

        if let Some(alias) = item.alias {
            alias_map.insert(alias, &item.expression);
            columns.push((alias.to_string(), alias.to_string()));
            if let Expression::Variable(variable) = &item.expression {
                columns.push(((*variable).to_string(), alias.to_string()));
            }
        } else if let Expression::Variable(variable) = &item.expression {
            if *variable != "*" {
                columns.push(((*variable).to_string(), (*variable).to_string()));
            }
        }

        if contains_aggregation(&item.expression) {
            has_aggregation = true;
        } else {
            plain_expressions.push(translate_expression(ctx, &scope, &item.expression)?);
        }
    }

    let cte_name = ctx.next_cte_name("cte");
    let distinct = if with.distinct { "DISTINCT " } else { "" };
    let mut sql = format!(
        "{} AS (SELECT {}{}",
        cte_name,
        distinct,
        select_items.join(", ")
    );
    if let Some(from) = state.from_clause() {
        sql.push_str(&format!("\nFROM {}", from));
    }
    if !state.where_parts.is_empty() {
        let conditions: Vec<String> = state
            .where_parts
            .iter()
            .map(|w| format!("({})", w))
            .collect();
        sql.push_str(&format!("\nWHERE {}", conditions.join(" AND ")));
    }
    if has_aggregation && !plain_expressions.is_empty() {
        sql.push_str(&format!("\nGROUP BY {}", plain_expressions.join(", ")));
    }
    if let Some(predicate) = &with.where_clause {
        // HAVING cannot see SELECT aliases; expand them to full expressions.
        let having = translate_having(ctx, &alias_map, predicate)?;
        sql.push_str(&format!("\nHAVING {}", having));
    }
    if let Some(order_by) = &with.order_by {
        sql.push_str(&format!(" ORDER BY {}", order_items(ctx, &scope, order_by)?));
    }
    if let Some(limit) = &with.limit {
        sql.push_str(&format!(" LIMIT {}", translate_expression(ctx, &scope, limit)?));
    }
    if let Some(skip) = &with.skip {
        sql.push_str(&format!(" OFFSET {}", translate_expression(ctx, &scope, skip)?));
    }
    sql.push(')');

    state.cte_parts.push(sql);
    state.begin_cte_scope(cte_name, columns);
    Ok(())
}

fn build_return(
    ctx: &mut TranslationContext<'_>,
    state: &QueryState,
    ret: &ReturnClause<'_>,
) -> Result<String> {
    let scope = &state.cte_columns;
    let using_cte = state.selecting_from_cte;

    let mut select_items = Vec::new();
    let mut has_aggregation = false;
    let mut plain_expressions = Vec::new();

    for item in &ret.items {
        select_items.push(render_projection(ctx, scope, item)?);
        if contains_aggregation(&item.expression) {
            has_aggregation = true;
        } else if !using_cte && !matches!(item.expression, Expression::Variable("*")) {
            plain_expressions.push(translate_expression(ctx, scope, &item.expression)?);
        }
    }

    let distinct = if ret.distinct { "DISTINCT " } else { "" };
    let mut sql = format!("SELECT {}{}", distinct, select_items.join(", "));
    if let Some(from) = state.from_clause() {
        sql.push_str(&format!("\nFROM {}", from));
    }
    if !state.where_parts.is_empty() {
        sql.push_str(&format!("\nWHERE {}", state.where_parts.join(" AND ")));
    }
    if has_aggregation && !plain_expressions.is_empty() && !using_cte {
        sql.push_str(&format!("\nGROUP BY {}", plain_expressions.join(", ")));
    }
    if let Some(order_by) = &ret.order_by {
        sql.push_str(&format!("\nORDER BY {}", order_items(ctx, scope, order_by)?));
    }
    if let Some(skip) = &ret.skip {
        sql.push_str(&format!("\nOFFSET {}", translate_expression(ctx, scope, skip)?));
    }
    if let Some(limit) = &ret.limit {
        sql.push_str(&format!("\nLIMIT {}", translate_expression(ctx, scope, limit)?));
    }
    Ok(sql)
}

/// Render one projection item. Bare node variables widen to the whole row as
/// JSON; variables projected through a CTE reference its columns directly.
fn render_projection(
    ctx: &mut TranslationContext<'_>,
    scope: &CteColumns,
    item: &Projection<'_>,
) -> Result<String> {
    if let Expression::Variable(variable) = &item.expression {
        if *variable == "*" {
            return Ok("*".to_string());
        }
        if let Some(column) = cte_column(scope, variable) {
            return Ok(match item.alias {
                Some(alias) if alias != column => format!("{} AS {}", column, alias),
                _ => column.to_string(),
            });
        }
        if let Some(alias) = ctx.lookup_alias(variable) {
            let table_alias = alias.to_string();
            let output = item.alias.unwrap_or(*variable);
            return Ok(format!("row_to_json({}.*) AS {}", table_alias, output));
        }
    }

    let sql = translate_expression(ctx, scope, &item.expression)?;
    Ok(match item.alias {
        Some(alias) => format!("{} AS {}", sql, alias),
        None => sql,
    })
}

fn order_items(
    ctx: &mut TranslationContext<'_>,
    scope: &CteColumns,
    items: &[SortItem<'_>],
) -> Result<String> {
    let mut rendered = Vec::new();
    for item in items {
        rendered.push(format!(
            "{} {}",
            translate_expression(ctx, scope, &item.expression)?,
            item.order.as_sql()
        ));
    }
    Ok(rendered.join(", "))
}
