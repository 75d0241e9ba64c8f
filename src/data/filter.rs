//! Free-text search and structured column filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::data::date_format::parse_any;
use crate::data::row::{is_empty_value, number_text, numeric_value, search_text_of, Row};

/// How the outcomes of several predicates are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterOperator {
    And,
    #[default]
    Or,
}

/// Comparison applied by a single predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Condition {
    /// Not chosen yet; always passes
    #[default]
    #[serde(rename = "")]
    Unset,
    IsExactly,
    Empty,
    NotEmpty,
    NotEqualTo,
    LessThan,
    LessThanEqualTo,
    GreaterThan,
    GreaterThanEqualTo,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    Is,
    IsNot,
    IsAfter,
    IsBefore,
}

impl Condition {
    /// Evaluate `cell <condition> operand`; anything not comparable is false
    pub fn evaluate(&self, cell: Option<&Value>, operand: &Value) -> bool {
        match self {
            Condition::Unset => true,
            Condition::Empty => is_empty_value(cell),
            Condition::NotEmpty => !is_empty_value(cell),
            Condition::IsExactly => cell.is_some_and(|c| loose_text(c) == loose_text(operand)),
            Condition::NotEqualTo => cell.is_some_and(|c| loose_text(c) != loose_text(operand)),
            Condition::LessThan => numeric(cell, operand, |a, b| a < b),
            Condition::LessThanEqualTo => numeric(cell, operand, |a, b| a <= b),
            Condition::GreaterThan => numeric(cell, operand, |a, b| a > b),
            Condition::GreaterThanEqualTo => numeric(cell, operand, |a, b| a >= b),
            Condition::Contains => text(cell, operand, |a, b| a.contains(b)),
            Condition::DoesNotContain => text(cell, operand, |a, b| !a.contains(b)),
            Condition::StartsWith => text(cell, operand, |a, b| a.starts_with(b)),
            Condition::EndsWith => text(cell, operand, |a, b| a.ends_with(b)),
            Condition::Is => day(cell, operand, |a, b| a == b),
            Condition::IsNot => day(cell, operand, |a, b| a != b),
            Condition::IsAfter => day(cell, operand, |a, b| a > b),
            Condition::IsBefore => day(cell, operand, |a, b| a < b),
        }
    }
}

fn loose_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    }
}

fn numeric(cell: Option<&Value>, operand: &Value, op: fn(f64, f64) -> bool) -> bool {
    match (cell.and_then(numeric_value), numeric_value(operand)) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

fn text(cell: Option<&Value>, operand: &Value, op: fn(&str, &str) -> bool) -> bool {
    match (cell, operand) {
        (Some(Value::String(a)), Value::String(b)) => op(&a.to_lowercase(), &b.to_lowercase()),
        _ => false,
    }
}

fn day(cell: Option<&Value>, operand: &Value, op: fn(DateTime<Utc>, DateTime<Utc>) -> bool) -> bool {
    let start_of_day = |dt: DateTime<Utc>| dt.date_naive().and_hms_opt(0, 0, 0).map(|n| n.and_utc());
    match (
        cell.and_then(parse_any).and_then(start_of_day),
        parse_any(operand).and_then(start_of_day),
    ) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

/// One structured filter on a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub column: String,
    #[serde(default)]
    pub operator: FilterOperator,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub value: Value,
}

impl FilterPredicate {
    pub fn new(column: impl Into<String>, condition: Condition, value: Value) -> Self {
        Self {
            column: column.into(),
            operator: FilterOperator::Or,
            condition,
            value,
        }
    }

    pub fn with_operator(mut self, operator: FilterOperator) -> Self {
        self.operator = operator;
        self
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.condition.evaluate(row.get(&self.column), &self.value)
    }
}

/// The operator shared by every predicate of one evaluation: taken from the
/// second predicate when there are at least two, OR otherwise
pub fn combination_operator(filters: &[FilterPredicate]) -> FilterOperator {
    if filters.len() >= 2 {
        filters[1].operator
    } else {
        FilterOperator::Or
    }
}

/// Fold every predicate with the shared operator; an empty list passes
pub fn matches_filters(row: &Row, filters: &[FilterPredicate]) -> bool {
    if filters.is_empty() {
        return true;
    }
    match combination_operator(filters) {
        FilterOperator::And => filters.iter().fold(true, |acc, f| acc && f.matches(row)),
        FilterOperator::Or => filters.iter().fold(false, |acc, f| acc || f.matches(row)),
    }
}

/// Upper-cased search key; empty when there is nothing to search for
pub fn search_key(search_text: &str) -> String {
    search_text.to_uppercase()
}

/// A row matches when its joined values contain the (upper-cased) key
pub fn matches_search(row: &Row, key: &str) -> bool {
    if key.is_empty() {
        return true;
    }
    let joined = row
        .values()
        .map(search_text_of)
        .collect::<Vec<_>>()
        .join(", ")
        .to_uppercase();
    joined.contains(key)
}

/// Search first, then structured filters; returns the surviving indices of
/// `candidates` in their original order
pub fn filter_indices(
    rows: &[Row],
    candidates: &[usize],
    search_text: &str,
    filters: &[FilterPredicate],
) -> Vec<usize> {
    let key = search_key(search_text);
    let kept: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&idx| {
            let row = &rows[idx];
            matches_search(row, &key) && matches_filters(row, filters)
        })
        .collect();
    debug!(
        "Filtered {} rows down to {} (search={:?}, {} filters)",
        candidates.len(),
        kept.len(),
        search_text,
        filters.len()
    );
    kept
}
