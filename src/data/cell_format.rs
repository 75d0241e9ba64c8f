use serde_json::Value;
use tracing::trace;

use crate::data::column::ColumnType;
use crate::data::date_format::{output_pattern, parse_any, parse_with_input_format, DatePattern};
use crate::data::row::{is_empty_value, number_text, numeric_value};

/// Marker shown for a cell that cannot be coerced to its column type
pub const INVALID_VALUE: &str = "Invalid Value";

const TIME_PATTERN: &str = "%H:%M";

/// Format one raw cell for display. Never fails: every problem degrades to
/// [`INVALID_VALUE`] or an empty string.
pub fn format_cell(
    value: Option<&Value>,
    column_type: ColumnType,
    output_format: &str,
    input_format: &str,
) -> String {
    match column_type {
        ColumnType::Currency => format_currency(value, output_format),
        ColumnType::Date => format_date(value, input_format, output_format),
        ColumnType::Time => format_time(value),
        ColumnType::Text
        | ColumnType::Number
        | ColumnType::Image
        | ColumnType::Video => format_default(value),
    }
}

fn format_default(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_text(n),
        Some(other) => other.to_string(),
    }
}

fn format_currency(value: Option<&Value>, symbol: &str) -> String {
    let Some(value) = value.filter(|v| !is_empty_value(Some(*v))) else {
        return symbol.to_string();
    };
    match numeric_value(value) {
        Some(_) => {
            let text = match value {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => number_text(n),
                other => other.to_string(),
            };
            format!("{}{}", symbol, text)
        }
        None => {
            trace!("Currency cell is not numeric: {}", value);
            INVALID_VALUE.to_string()
        }
    }
}

fn format_date(value: Option<&Value>, input_format: &str, output_format: &str) -> String {
    let Some(value) = value.filter(|v| !is_empty_value(Some(*v))) else {
        return String::new();
    };
    match parse_with_input_format(value, input_format) {
        Some(dt) => DatePattern::compile(output_pattern(input_format, output_format)).format(&dt),
        None => {
            trace!("Date cell {} does not match input format {:?}", value, input_format);
            INVALID_VALUE.to_string()
        }
    }
}

fn format_time(value: Option<&Value>) -> String {
    let Some(value) = value.filter(|v| !is_empty_value(Some(*v))) else {
        return String::new();
    };
    match parse_any(value) {
        Some(dt) => dt.format(TIME_PATTERN).to_string(),
        None => {
            trace!("Time cell is not a timestamp: {}", value);
            INVALID_VALUE.to_string()
        }
    }
}
