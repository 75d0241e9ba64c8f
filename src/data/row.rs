use serde_json::{Map, Number, Value};

/// A single row of table data, keyed by column id in insertion order
pub type Row = Map<String, Value>;

/// Collect every key seen across all rows, in first-seen order
pub fn all_column_keys(rows: &[Row]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.clone());
            }
        }
    }
    keys
}

/// A row with every known key mapped to null, used when nothing is selected
pub fn empty_row(rows: &[Row]) -> Row {
    all_column_keys(rows)
        .into_iter()
        .map(|key| (key, Value::Null))
        .collect()
}

/// Convert a JSON array of objects into rows, skipping non-object entries
pub fn rows_from_json(value: &Value) -> Vec<Row> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .collect(),
        Value::Object(obj) => vec![obj.clone()],
        _ => Vec::new(),
    }
}

/// Display text of a JSON number; floats without a fraction print as
/// integers ("30", not "30.0")
pub fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Render a raw value the way it appears when a row is joined for searching
pub fn search_text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(search_text_of)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Numeric view of a raw value: JSON numbers and numeric strings
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
            }
        }
        _ => None,
    }
}

/// Absent, null and the empty string all count as empty
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Row> {
        rows_from_json(&value)
    }

    #[test]
    fn test_key_union_preserves_first_seen_order() {
        let data = rows(json!([
            {"id": 1, "name": "Ross"},
            {"id": 2, "age": 30, "name": "Joey"},
            {"city": "NY"}
        ]));
        assert_eq!(all_column_keys(&data), vec!["id", "name", "age", "city"]);
    }

    #[test]
    fn test_empty_row_has_all_keys() {
        let data = rows(json!([{"a": 1}, {"b": 2}]));
        let empty = empty_row(&data);
        assert_eq!(empty.len(), 2);
        assert!(empty.values().all(Value::is_null));
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value(&json!(12)), Some(12.0));
        assert_eq!(numeric_value(&json!(" 4.5 ")), Some(4.5));
        assert_eq!(numeric_value(&json!("abc")), None);
        assert_eq!(numeric_value(&json!("")), None);
        assert_eq!(numeric_value(&json!(true)), None);
    }

    #[test]
    fn test_whole_floats_print_as_integers() {
        assert_eq!(search_text_of(&json!(30.0)), "30");
        assert_eq!(search_text_of(&json!(-2.0)), "-2");
        assert_eq!(search_text_of(&json!(30.5)), "30.5");
        assert_eq!(search_text_of(&json!(7)), "7");
    }

    #[test]
    fn test_search_text_of_nested_values() {
        assert_eq!(search_text_of(&json!(null)), "");
        assert_eq!(search_text_of(&json!([1, "a", null])), "1,a,");
        assert_eq!(search_text_of(&json!({"k": 1})), r#"{"k":1}"#);
    }
}
