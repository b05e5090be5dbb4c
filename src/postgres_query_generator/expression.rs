use std::collections::HashMap;

use serde_json::{json, Value};

use crate::cypher_parser::ast::{
    Comparison, ComparisonOperator, Expression, FunctionCall, Literal, UnaryOperator,
};

use super::context::TranslationContext;
use super::errors::PostgresQueryGeneratorError;
use super::functions::{self, NUMERIC_AGGREGATES};
use super::schema;

type Result<T> = std::result::Result<T, PostgresQueryGeneratorError>;

/// Column scope of the active WITH CTE: (variable-or-alias, column name).
pub(crate) type CteColumns = [(String, String)];

/// Aliases defined by WITH items, used to expand HAVING references back to
/// their full expressions (SQL's HAVING cannot see SELECT aliases).
pub(crate) type AliasMap<'q, 'e> = HashMap<&'q str, &'e Expression<'q>>;

pub(crate) fn cte_column<'s>(cte_columns: &'s CteColumns, name: &str) -> Option<&'s str> {
    cte_columns
        .iter()
        .find(|(var, _)| var == name)
        .map(|(_, col)| col.as_str())
}

/// Translate an expression to a SQL fragment, appending parameters to the
/// context as it goes.
pub(crate) fn translate_expression(
    ctx: &mut TranslationContext<'_>,
    cte_columns: &CteColumns,
    expr: &Expression<'_>,
) -> Result<String> {
    translate_with_aliases(ctx, cte_columns, None, expr)
}

/// HAVING-position translation: `aliases` maps SELECT-item aliases to their
/// source expressions, which are substituted in place of alias references.
pub(crate) fn translate_having(
    ctx: &mut TranslationContext<'_>,
    aliases: &AliasMap<'_, '_>,
    expr: &Expression<'_>,
) -> Result<String> {
    translate_with_aliases(ctx, &[], Some(aliases), expr)
}

fn translate_with_aliases(
    ctx: &mut TranslationContext<'_>,
    cte_columns: &CteColumns,
    aliases: Option<&AliasMap<'_, '_>>,
    expr: &Expression<'_>,
) -> Result<String> {
    match expr {
        Expression::Variable(name) => {
            if let Some(map) = aliases {
                if let Some(source) = map.get(name) {
                    // Expand once; the source expression cannot itself
                    // reference SELECT aliases.
                    return translate_with_aliases(ctx, cte_columns, None, source);
                }
            }
            if *name == "*" {
                return Ok("*".to_string());
            }
            if let Some(column) = cte_column(cte_columns, name) {
                return Ok(column.to_string());
            }
            match ctx.lookup_alias(name) {
                Some(alias) => Ok(format!("{}.uuid", alias)),
                // Unbound names pass through: projection aliases in ORDER BY
                // resolve this way.
                None => Ok((*name).to_string()),
            }
        }

        Expression::Parameter(name) => {
            let value = ctx.binding(name)?;
            Ok(ctx.bind(value))
        }

        Expression::Literal(literal) => translate_literal(ctx, literal),

        Expression::List(items) => {
            let rendered: Vec<String> = items
                .iter()
                .map(|item| translate_with_aliases(ctx, cte_columns, aliases, item))
                .collect::<Result<_>>()?;
            Ok(format!("ARRAY[{}]", rendered.join(", ")))
        }

        Expression::Map(_) => {
            // Maps travel as JSON-serialized string parameters.
            let value = evaluate_literal(ctx, expr)?;
            let serialized = to_json_text(&value)?;
            Ok(ctx.bind(Value::String(serialized)))
        }

        Expression::PropertyAccess(access) => {
            translate_property_access(ctx, cte_columns, aliases, &access.base, access.key)
        }

        Expression::IndexAccess(access) => {
            let base = translate_with_aliases(ctx, cte_columns, aliases, &access.base)?;
            let index = translate_with_aliases(ctx, cte_columns, aliases, &access.index)?;
            // Cypher indexes from 0, PostgreSQL arrays from 1.
            Ok(format!("({})[({}) + 1]", base, index))
        }

        Expression::BinaryOp(op) => {
            let left = translate_with_aliases(ctx, cte_columns, aliases, &op.left)?;
            let right = translate_with_aliases(ctx, cte_columns, aliases, &op.right)?;
            Ok(format!("({} {} {})", left, op.operator.as_sql(), right))
        }

        Expression::UnaryOp(op) => {
            let operand = translate_with_aliases(ctx, cte_columns, aliases, &op.operand)?;
            match op.operator {
                UnaryOperator::Not => Ok(format!("NOT {}", operand)),
                UnaryOperator::Minus => Ok(format!("-{}", operand)),
            }
        }

        Expression::Comparison(cmp) => translate_comparison(ctx, cte_columns, aliases, cmp),

        Expression::FunctionCall(call) => translate_function_call(ctx, cte_columns, aliases, call),

        Expression::Case(case) => {
            let mut sql = "CASE".to_string();
            if let Some(test) = &case.test {
                sql.push(' ');
                sql.push_str(&translate_with_aliases(ctx, cte_columns, aliases, test)?);
            }
            for (when, then) in &case.alternatives {
                let when_sql = translate_with_aliases(ctx, cte_columns, aliases, when)?;
                let then_sql = translate_with_aliases(ctx, cte_columns, aliases, then)?;
                sql.push_str(&format!(" WHEN {} THEN {}", when_sql, then_sql));
            }
            if let Some(else_expr) = &case.else_expression {
                let else_sql = translate_with_aliases(ctx, cte_columns, aliases, else_expr)?;
                sql.push_str(&format!(" ELSE {}", else_sql));
            }
            sql.push_str(" END");
            Ok(sql)
        }

        Expression::ListComprehension(_) => Err(
            PostgresQueryGeneratorError::UnsupportedExpression("list comprehension"),
        ),
        Expression::PatternComprehension(_) => Err(
            PostgresQueryGeneratorError::UnsupportedExpression("pattern comprehension"),
        ),
        Expression::Quantifier(_) => Err(PostgresQueryGeneratorError::UnsupportedExpression(
            "quantifier (ALL/ANY/NONE/SINGLE)",
        )),
    }
}

fn translate_literal(ctx: &mut TranslationContext<'_>, literal: &Literal) -> Result<String> {
    match literal {
        // Numbers are emitted verbatim, not parameterized.
        Literal::Integer(value) => Ok(value.to_string()),
        Literal::Float(value) => Ok(value.to_string()),
        Literal::String(value) => Ok(ctx.bind(json!(value))),
        Literal::Boolean(true) => Ok("TRUE".to_string()),
        Literal::Boolean(false) => Ok("FALSE".to_string()),
        Literal::Null => Ok("NULL".to_string()),
    }
}

fn translate_property_access(
    ctx: &mut TranslationContext<'_>,
    cte_columns: &CteColumns,
    aliases: Option<&AliasMap<'_, '_>>,
    base: &Expression<'_>,
    key: &str,
) -> Result<String> {
    if let Expression::Variable(name) = base {
        // A variable projected through a WITH CTE holds the node as JSONB
        // (row_to_json), so property access becomes a JSONB lookup on the
        // CTE column.
        if let Some(column) = cte_column(cte_columns, name) {
            return Ok(format!("{}->>'{}'", column, key));
        }
        let base_sql = match ctx.lookup_alias(name) {
            Some(alias) => alias.to_string(),
            None => (*name).to_string(),
        };
        if schema::is_known_column(key) {
            return Ok(format!("{}.{}", base_sql, key));
        }
        return Ok(format!("{}.properties->>'{}'", base_sql, key));
    }

    // Nested base (index access, function result): plain JSONB text lookup.
    let base_sql = translate_with_aliases(ctx, cte_columns, aliases, base)?;
    Ok(format!("({})->>'{}'", base_sql, key))
}

/// Rewrite a JSONB text access for numeric ordering: `x.properties->>'k'`
/// compares lexicographically, `(x.properties->'k')::numeric` numerically.
fn coerce_jsonb_numeric(left: &str) -> String {
    format!("({})::numeric", left.replace("properties->>", "properties->"))
}

fn is_numeric_literal(expr: &Expression<'_>) -> bool {
    match expr {
        Expression::Literal(Literal::Integer(_)) | Expression::Literal(Literal::Float(_)) => true,
        // A negative literal parses as unary minus over a number.
        Expression::UnaryOp(op) if op.operator == UnaryOperator::Minus => {
            is_numeric_literal(&op.operand)
        }
        _ => false,
    }
}

fn translate_comparison(
    ctx: &mut TranslationContext<'_>,
    cte_columns: &CteColumns,
    aliases: Option<&AliasMap<'_, '_>>,
    cmp: &Comparison<'_>,
) -> Result<String> {
    let mut left = translate_with_aliases(ctx, cte_columns, aliases, &cmp.left)?;

    if cmp.operator.is_postfix() {
        let op = match cmp.operator {
            ComparisonOperator::IsNull => "IS NULL",
            _ => "IS NOT NULL",
        };
        return Ok(format!("{} {}", left, op));
    }

    let right_expr = cmp.right.as_deref().ok_or(
        PostgresQueryGeneratorError::UnsupportedExpression(
            "binary comparison without a right operand",
        ),
    )?;
    let right = translate_with_aliases(ctx, cte_columns, aliases, right_expr)?;

    match cmp.operator {
        ComparisonOperator::In | ComparisonOperator::NotIn => {
            // Coerce JSONB text when comparing against a numeric list.
            if left.contains("properties->>") {
                if let Expression::List(items) = right_expr {
                    if items.first().is_some_and(is_numeric_literal) {
                        left = coerce_jsonb_numeric(&left);
                    }
                }
            }
            let membership = format!("{} = ANY({})", left, right);
            if cmp.operator == ComparisonOperator::NotIn {
                Ok(format!("NOT ({})", membership))
            } else {
                Ok(membership)
            }
        }
        ComparisonOperator::Contains => Ok(format!("{} LIKE '%' || {} || '%'", left, right)),
        ComparisonOperator::StartsWith => Ok(format!("{} LIKE {} || '%'", left, right)),
        ComparisonOperator::EndsWith => Ok(format!("{} LIKE '%' || {}", left, right)),
        ComparisonOperator::Regex => Ok(format!("{} ~ {}", left, right)),
        _ => {
            if left.contains("properties->>") && is_numeric_literal(right_expr) {
                left = coerce_jsonb_numeric(&left);
            }
            let op = match cmp.operator {
                ComparisonOperator::Eq => "=",
                ComparisonOperator::Ne => "!=",
                ComparisonOperator::Lt => "<",
                ComparisonOperator::Gt => ">",
                ComparisonOperator::Le => "<=",
                ComparisonOperator::Ge => ">=",
                _ => unreachable!("remaining operators handled above"),
            };
            Ok(format!("({} {} {})", left, op, right))
        }
    }
}

fn translate_function_call(
    ctx: &mut TranslationContext<'_>,
    cte_columns: &CteColumns,
    aliases: Option<&AliasMap<'_, '_>>,
    call: &FunctionCall<'_>,
) -> Result<String> {
    let name = functions::sql_function_name(call.name);

    let mut args = Vec::with_capacity(call.args.len());
    for (i, arg) in call.args.iter().enumerate() {
        // COUNT of a bare node variable counts rows of that alias.
        if i == 0 && name == "COUNT" {
            if let Expression::Variable(var) = arg {
                if *var == "*" {
                    args.push("*".to_string());
                    continue;
                }
                if cte_column(cte_columns, var).is_none() {
                    if let Some(alias) = ctx.lookup_alias(var) {
                        args.push(format!("{}.*", alias));
                        continue;
                    }
                }
            }
        }
        args.push(translate_with_aliases(ctx, cte_columns, aliases, arg)?);
    }

    // Numeric aggregates over JSONB text order lexicographically; coerce.
    if NUMERIC_AGGREGATES.contains(&name.as_str()) {
        if let Some(first) = args.first_mut() {
            if first.contains("properties->>") {
                *first = coerce_jsonb_numeric(first);
            }
        }
    }

    let distinct = if call.distinct { "DISTINCT " } else { "" };
    Ok(format!("{}({}{})", name, distinct, args.join(", ")))
}

/// True when the expression contains an aggregation call anywhere; decides
/// whether the surrounding projection triggers GROUP BY.
pub(crate) fn contains_aggregation(expr: &Expression<'_>) -> bool {
    match expr {
        Expression::FunctionCall(call) => {
            functions::is_aggregate(call.name) || call.args.iter().any(contains_aggregation)
        }
        Expression::PropertyAccess(access) => contains_aggregation(&access.base),
        Expression::IndexAccess(access) => {
            contains_aggregation(&access.base) || contains_aggregation(&access.index)
        }
        Expression::BinaryOp(op) => {
            contains_aggregation(&op.left) || contains_aggregation(&op.right)
        }
        Expression::UnaryOp(op) => contains_aggregation(&op.operand),
        Expression::Comparison(cmp) => {
            contains_aggregation(&cmp.left)
                || cmp.right.as_deref().is_some_and(contains_aggregation)
        }
        _ => false,
    }
}

/// Evaluate a literal-shaped expression to a JSON value. Parameters resolve
/// through the bindings; anything computed is rejected.
pub(crate) fn evaluate_literal(
    ctx: &TranslationContext<'_>,
    expr: &Expression<'_>,
) -> Result<Value> {
    match expr {
        Expression::Literal(Literal::Integer(v)) => Ok(json!(v)),
        Expression::Literal(Literal::Float(v)) => Ok(json!(v)),
        Expression::Literal(Literal::String(v)) => Ok(json!(v)),
        Expression::Literal(Literal::Boolean(v)) => Ok(json!(v)),
        Expression::Literal(Literal::Null) => Ok(Value::Null),
        Expression::Parameter(name) => ctx.binding(name),
        Expression::UnaryOp(op) if op.operator == UnaryOperator::Minus => {
            match evaluate_literal(ctx, &op.operand)? {
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Ok(json!(-i))
                    } else if let Some(f) = n.as_f64() {
                        Ok(json!(-f))
                    } else {
                        Err(PostgresQueryGeneratorError::NonLiteralMapValue("number"))
                    }
                }
                _ => Err(PostgresQueryGeneratorError::NonLiteralMapValue(
                    "negated non-number",
                )),
            }
        }
        Expression::List(items) => {
            let values: Vec<Value> = items
                .iter()
                .map(|item| evaluate_literal(ctx, item))
                .collect::<Result<_>>()?;
            Ok(Value::Array(values))
        }
        Expression::Map(entries) => {
            let mut object = serde_json::Map::new();
            for (key, value) in entries {
                object.insert((*key).to_string(), evaluate_literal(ctx, value)?);
            }
            Ok(Value::Object(object))
        }
        Expression::Variable(_) => Err(PostgresQueryGeneratorError::NonLiteralMapValue("variable")),
        Expression::FunctionCall(_) => Err(PostgresQueryGeneratorError::NonLiteralMapValue(
            "function call",
        )),
        _ => Err(PostgresQueryGeneratorError::NonLiteralMapValue("expression")),
    }
}

pub(crate) fn to_json_text(value: &Value) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| PostgresQueryGeneratorError::Serialization(e.to_string()))
}
