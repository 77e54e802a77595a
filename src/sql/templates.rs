//! Clause renderers and statement assembly.
//!
//! Every function here is pure: the same inputs always produce the same
//! string. Expressions arrive already alias-qualified (see
//! [`SqlTemplate`](super::expr::SqlTemplate)); this module only arranges them
//! into clauses and formats literal values.

use serde::{Deserialize, Serialize};

use super::dialect::SqlDialect;
use super::time::DateRange;
use crate::catalog::{DataType, Entity};
use crate::intent::{FilterCondition, FilterOperator};

/// Errors raised while rendering a clause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("filter on '{dimension}' has no values")]
    EmptyFilterValues { dimension: String },
}

/// Ordering applied when a query has no dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderFallback {
    /// No ORDER BY clause.
    #[default]
    None,
    /// `ORDER BY 1 DESC` on the metric column.
    MetricDesc,
}

/// `{expr} AS {quoted_name}`
pub fn select_item(expr: &str, name: &str, dialect: &dyn SqlDialect) -> String {
    format!("{} AS {}", expr, dialect.quote_identifier(name))
}

pub fn select_clause(items: &[String]) -> String {
    format!("SELECT\n  {}", items.join(",\n  "))
}

pub fn from_clause(entity: &Entity, alias: &str) -> String {
    format!("FROM {} {}", entity.qualified_table(), alias)
}

/// Join clauses in path order, one per line.
pub fn join_clauses(joins: &[String]) -> String {
    joins.join("\n")
}

/// `{expr} BETWEEN '{start}' AND '{end}'`
pub fn time_filter(expr: &str, range: &DateRange) -> String {
    format!(
        "{} BETWEEN '{}' AND '{}'",
        expr,
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d")
    )
}

/// Render one filter against an already-rendered dimension expression.
///
/// List operators always render a parenthesised list. A scalar operator with
/// more than one value becomes `IN (...)`, or `NOT IN (...)` for `not_equals`.
pub fn filter_condition(
    expr: &str,
    filter: &FilterCondition,
    data_type: DataType,
    dialect: &dyn SqlDialect,
) -> Result<String, RenderError> {
    let values: Vec<String> = filter
        .values
        .iter()
        .map(|v| format_value(v, data_type, dialect))
        .collect();

    match values.as_slice() {
        [] => Err(RenderError::EmptyFilterValues {
            dimension: filter.dimension.clone(),
        }),
        [value] if !filter.operator.is_list() => {
            Ok(format!("{} {} {}", expr, filter.operator.sql_operator(), value))
        }
        _ => {
            let operator = match filter.operator {
                FilterOperator::NotIn | FilterOperator::NotEquals => "NOT IN",
                _ => "IN",
            };
            Ok(format!("{} {} ({})", expr, operator, values.join(", ")))
        }
    }
}

/// Format a filter value as a SQL literal for a dimension of `data_type`.
///
/// Numbers stay unquoted when they parse; booleans map common truthy and
/// falsy tokens to keywords. Anything else becomes a quoted string.
pub fn format_value(value: &str, data_type: DataType, dialect: &dyn SqlDialect) -> String {
    match data_type {
        DataType::Number if is_number(value) => value.to_string(),
        DataType::Boolean => match parse_bool(value) {
            Some(b) => dialect.format_bool(b).to_string(),
            None => dialect.quote_string(value),
        },
        _ => dialect.quote_string(value),
    }
}

fn is_number(value: &str) -> bool {
    value
        .parse::<f64>()
        .map(|n| n.is_finite())
        .unwrap_or(false)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

pub fn where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    format!("WHERE {}", conditions.join(" AND "))
}

/// Positional GROUP BY over the first `dimension_count` select items.
pub fn group_by_clause(dimension_count: usize) -> String {
    if dimension_count == 0 {
        return String::new();
    }
    let positions: Vec<String> = (1..=dimension_count).map(|i| i.to_string()).collect();
    format!("GROUP BY {}", positions.join(", "))
}

pub fn order_by_clause(dimension_count: usize, fallback: OrderFallback) -> String {
    if dimension_count == 0 {
        return match fallback {
            OrderFallback::None => String::new(),
            OrderFallback::MetricDesc => "ORDER BY 1 DESC".to_string(),
        };
    }
    let positions: Vec<String> = (1..=dimension_count).map(|i| format!("{} ASC", i)).collect();
    format!("ORDER BY {}", positions.join(", "))
}

pub fn limit_clause(limit: Option<u64>, dialect: &dyn SqlDialect) -> String {
    limit.map(|n| dialect.emit_limit(n)).unwrap_or_default()
}

/// Join non-empty parts with newlines and terminate with `;`.
pub fn assemble(parts: &[String]) -> String {
    let body: Vec<&str> = parts
        .iter()
        .map(String::as_str)
        .filter(|p| !p.is_empty())
        .collect();
    format!("{};", body.join("\n"))
}
