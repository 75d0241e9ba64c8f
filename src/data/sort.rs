use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::debug;

use crate::data::column::ColumnType;
use crate::data::date_format::{parse_any, InputFormat};
use crate::data::row::{numeric_value, search_text_of, Row};

/// The single active sort column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub asc: bool,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, asc: bool) -> Self {
        Self {
            column: column.into(),
            asc,
        }
    }
}

/// Comparable form of one cell, extracted once per row before sorting
#[derive(Debug, Clone, PartialEq, PartialOrd)]
enum SortKey {
    Number(f64),
    Instant(DateTime<Utc>),
    Text(String),
}

/// Turns raw cells into sort keys for one column
struct KeyExtractor {
    column_type: ColumnType,
    input_format: InputFormat,
}

impl KeyExtractor {
    fn new(column_type: ColumnType, input_format: &str) -> Self {
        Self {
            column_type,
            input_format: InputFormat::new(input_format),
        }
    }

    /// None for missing or unparseable cells
    fn key(&self, value: Option<&Value>) -> Option<SortKey> {
        let value = value?;
        match self.column_type {
            ColumnType::Number | ColumnType::Currency => numeric_value(value).map(SortKey::Number),
            ColumnType::Date => self.input_format.parse(value).map(SortKey::Instant),
            ColumnType::Time => parse_any(value).map(SortKey::Instant),
            ColumnType::Text | ColumnType::Image | ColumnType::Video => {
                Some(SortKey::Text(search_text_of(value).to_uppercase()))
            }
        }
    }
}

/// Missing keys sort after present ones
fn compare_keys(a: &Option<SortKey>, b: &Option<SortKey>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Compare two raw cells according to the column's declared type
pub fn compare_cells(
    a: Option<&Value>,
    b: Option<&Value>,
    column_type: ColumnType,
    input_format: &str,
) -> Ordering {
    let extractor = KeyExtractor::new(column_type, input_format);
    compare_keys(&extractor.key(a), &extractor.key(b))
}

/// Stable sort of row indices by one column; ties keep their input order.
/// Each cell is parsed once, not once per comparison.
pub fn sort_indices(
    rows: &[Row],
    indices: &mut [usize],
    spec: &SortSpec,
    column_type: ColumnType,
    input_format: &str,
) {
    debug!(
        "Sorting {} rows by {} ({:?}, asc={})",
        indices.len(),
        spec.column,
        column_type,
        spec.asc
    );
    let extractor = KeyExtractor::new(column_type, input_format);
    let mut keyed: Vec<(usize, Option<SortKey>)> = indices
        .iter()
        .map(|&i| (i, extractor.key(rows[i].get(&spec.column))))
        .collect();
    keyed.sort_by(|(_, a), (_, b)| {
        let cmp = compare_keys(a, b);
        if spec.asc {
            cmp
        } else {
            cmp.reverse()
        }
    });
    for (slot, (i, _)) in indices.iter_mut().zip(keyed) {
        *slot = i;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::row::rows_from_json;
    use serde_json::json;

    fn sorted(data: Value, spec: SortSpec, column_type: ColumnType, input: &str) -> Vec<usize> {
        let rows = rows_from_json(&data);
        let mut idx: Vec<usize> = (0..rows.len()).collect();
        sort_indices(&rows, &mut idx, &spec, column_type, input);
        idx
    }

    #[test]
    fn test_numeric_sort_is_not_lexical() {
        let data = json!([{"q": 1000}, {"q": 500}, {"q": "750"}, {"q": 2000}]);
        assert_eq!(
            sorted(data.clone(), SortSpec::new("q", true), ColumnType::Number, ""),
            vec![1, 2, 0, 3]
        );
        assert_eq!(
            sorted(data, SortSpec::new("q", false), ColumnType::Number, ""),
            vec![3, 0, 2, 1]
        );
    }

    #[test]
    fn test_text_sort_ignores_case() {
        let data = json!([{"n": "beta"}, {"n": "Alpha"}, {"n": "gamma"}]);
        assert_eq!(
            sorted(data, SortSpec::new("n", true), ColumnType::Text, ""),
            vec![1, 0, 2]
        );
    }

    #[test]
    fn test_sort_is_stable_both_directions() {
        let data = json!([
            {"k": 1, "id": "a"},
            {"k": 0, "id": "b"},
            {"k": 1, "id": "c"},
            {"k": 0, "id": "d"}
        ]);
        assert_eq!(
            sorted(data.clone(), SortSpec::new("k", true), ColumnType::Number, ""),
            vec![1, 3, 0, 2]
        );
        assert_eq!(
            sorted(data, SortSpec::new("k", false), ColumnType::Number, ""),
            vec![0, 2, 1, 3]
        );
    }

    #[test]
    fn test_date_sort_uses_input_format() {
        let data = json!([{"d": "03/01/2021"}, {"d": "01/02/2021"}, {"d": "02/01/2021"}]);
        assert_eq!(
            sorted(data, SortSpec::new("d", true), ColumnType::Date, "DD/MM/YYYY"),
            vec![2, 0, 1]
        );
    }

    #[test]
    fn test_compare_cells_by_type() {
        assert_eq!(
            compare_cells(Some(&json!("10")), Some(&json!(9)), ColumnType::Number, ""),
            Ordering::Greater
        );
        assert_eq!(
            compare_cells(Some(&json!("10")), Some(&json!(9)), ColumnType::Text, ""),
            Ordering::Less
        );
        assert_eq!(
            compare_cells(None, Some(&json!("x")), ColumnType::Text, ""),
            Ordering::Greater
        );
    }

    #[test]
    fn test_unparseable_values_sort_last() {
        let data = json!([{"q": "n/a"}, {"q": 3}, {}, {"q": 1}]);
        assert_eq!(
            sorted(data, SortSpec::new("q", true), ColumnType::Currency, ""),
            vec![3, 1, 0, 2]
        );
    }
}
