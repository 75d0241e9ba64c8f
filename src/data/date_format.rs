//! Date patterns in the token style used by column format settings
//! (`YYYY-MM-DD HH:mm`, `Do MMM YYYY`, `LLL`, ...), compiled into chrono
//! format items, plus the lenient parsing used by DATE/TIME columns.

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::data::row::{number_text, numeric_value};

/// Input format: value is a Unix timestamp in seconds
pub const EPOCH: &str = "EPOCH";
/// Input format: value is a Unix timestamp in milliseconds
pub const MILLISECONDS: &str = "Milliseconds";
/// Output format: reuse the input pattern
pub const SAME_AS_INPUT: &str = "SAME_AS_INPUT";
/// Output used when the input is an epoch and no explicit output is set
pub const ISO_PATTERN: &str = "YYYY-MM-DDTHH:mm:ss";

fn token_regex() -> &'static Regex {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    TOKENS.get_or_init(|| {
        Regex::new(
            r"\[[^\]]*\]|LLLL|LLL|LL|L|Do|YYYY|YY|MMMM|MMM|MM|M|DD|D|dddd|ddd|HH|H|hh|h|mm|m|SSS|sss|ss|s|A|a|ZZ|Z|X|.",
        )
        .expect("token pattern is valid")
    })
}

fn ordinal_regex() -> &'static Regex {
    static ORDINAL: OnceLock<Regex> = OnceLock::new();
    ORDINAL.get_or_init(|| Regex::new(r"(\d)(st|nd|rd|th)\b").expect("ordinal pattern is valid"))
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Strftime(String),
    OrdinalDay,
}

/// Calendar and clock fields a pattern carries; the rest get defaults when
/// parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Fields {
    year: bool,
    month: bool,
    day: bool,
    hour: bool,
    hour12: bool,
    meridiem: bool,
    minute: bool,
    timestamp: bool,
}

impl Fields {
    fn note(&mut self, token: &str) {
        match token {
            "YYYY" | "YY" => self.year = true,
            "MMMM" | "MMM" | "MM" | "M" => self.month = true,
            "Do" | "DD" | "D" => self.day = true,
            "HH" | "H" => self.hour = true,
            "hh" | "h" => self.hour12 = true,
            "A" | "a" => self.meridiem = true,
            "mm" | "m" => self.minute = true,
            "X" => self.timestamp = true,
            _ => {}
        }
    }
}

/// A compiled date pattern
#[derive(Debug, Clone, PartialEq)]
pub struct DatePattern {
    pieces: Vec<Piece>,
    fields: Fields,
}

impl DatePattern {
    pub fn compile(pattern: &str) -> Self {
        let mut pieces = Vec::new();
        let mut fields = Fields::default();
        compile_into(pattern, &mut pieces, &mut fields);
        Self { pieces, fields }
    }

    fn has_ordinal(&self) -> bool {
        self.pieces.contains(&Piece::OrdinalDay)
    }

    /// The chrono format string used for parsing; ordinals parse as plain days
    fn parse_format(&self) -> String {
        self.pieces
            .iter()
            .map(|p| match p {
                Piece::Strftime(s) => s.as_str(),
                Piece::OrdinalDay => "%-d",
            })
            .collect()
    }

    pub fn format(&self, dt: &DateTime<Utc>) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Strftime(s) => out.push_str(&dt.format(s).to_string()),
                Piece::OrdinalDay => out.push_str(&ordinal(dt.day())),
            }
        }
        out
    }

    /// Parse `input` with this pattern, falling back to general date parsing
    pub fn parse(&self, input: &str) -> Option<DateTime<Utc>> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let cleaned = if self.has_ordinal() {
            ordinal_regex().replace_all(input, "$1").into_owned()
        } else {
            input.to_string()
        };
        self.parse_exact(&cleaned)
            .or_else(|| parse_any_str(input))
    }

    /// Strict parse; fields the pattern lacks default to the current year,
    /// January, the 1st and midnight
    fn parse_exact(&self, input: &str) -> Option<DateTime<Utc>> {
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, input, StrftimeItems::new(&self.parse_format())).ok()?;

        let fields = self.fields;
        if !fields.timestamp {
            if !fields.year {
                parsed.set_year(i64::from(Utc::now().year())).ok()?;
            }
            if !fields.month {
                parsed.set_month(1).ok()?;
            }
            if !fields.day {
                parsed.set_day(1).ok()?;
            }
            if fields.hour12 && !fields.meridiem {
                parsed.set_ampm(false).ok()?;
            }
            if !fields.hour && !fields.hour12 && !fields.meridiem {
                parsed.set_hour(0).ok()?;
            }
            if !fields.minute {
                parsed.set_minute(0).ok()?;
            }
        }

        parsed
            .to_datetime()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| parsed.to_naive_datetime_with_offset(0).map(|n| n.and_utc()))
            .ok()
    }
}

fn compile_into(pattern: &str, pieces: &mut Vec<Piece>, fields: &mut Fields) {
    for token in token_regex().find_iter(pattern) {
        let token = token.as_str();
        fields.note(token);
        let spec: &str = match token {
            "LLLL" => {
                compile_into("dddd, MMMM D, YYYY h:mm A", pieces, fields);
                continue;
            }
            "LLL" => {
                compile_into("MMMM D, YYYY h:mm A", pieces, fields);
                continue;
            }
            "LL" => {
                compile_into("MMMM D, YYYY", pieces, fields);
                continue;
            }
            "L" => {
                compile_into("MM/DD/YYYY", pieces, fields);
                continue;
            }
            "Do" => {
                pieces.push(Piece::OrdinalDay);
                continue;
            }
            "YYYY" => "%Y",
            "YY" => "%y",
            "MMMM" => "%B",
            "MMM" => "%b",
            "MM" => "%m",
            "M" => "%-m",
            "DD" => "%d",
            "D" => "%-d",
            "dddd" => "%A",
            "ddd" => "%a",
            "HH" => "%H",
            "H" => "%-H",
            "hh" => "%I",
            "h" => "%-I",
            "mm" => "%M",
            "m" => "%-M",
            "SSS" | "sss" => "%3f",
            "ss" => "%S",
            "s" => "%-S",
            "A" => "%p",
            "a" => "%P",
            "ZZ" => "%z",
            "Z" => "%:z",
            "X" => "%s",
            literal => {
                let text = literal
                    .strip_prefix('[')
                    .and_then(|t| t.strip_suffix(']'))
                    .unwrap_or(literal);
                push_strftime(pieces, &text.replace('%', "%%"));
                continue;
            }
        };
        push_strftime(pieces, spec);
    }
}

fn push_strftime(pieces: &mut Vec<Piece>, spec: &str) {
    if let Some(Piece::Strftime(last)) = pieces.last_mut() {
        last.push_str(spec);
    } else {
        pieces.push(Piece::Strftime(spec.to_string()));
    }
}

fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", day, suffix)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// General-purpose parsing of a date/time string
pub fn parse_any_str(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
        }
    }
    None
}

/// Unix milliseconds to a UTC timestamp
pub fn from_epoch_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(millis.round() as i64).single()
}

/// Parse a raw cell value: numbers are Unix milliseconds, strings go
/// through general parsing
pub fn parse_any(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(_) => numeric_value(value).and_then(from_epoch_millis),
        Value::String(s) => match numeric_value(value) {
            Some(millis) => from_epoch_millis(millis),
            None => parse_any_str(s),
        },
        _ => None,
    }
}

/// A DATE column's input format, compiled once
#[derive(Debug, Clone, PartialEq)]
pub enum InputFormat {
    /// Unix seconds
    Epoch,
    /// Unix milliseconds
    Milliseconds,
    /// No input format: general parsing
    Any,
    Pattern(DatePattern),
}

impl InputFormat {
    pub fn new(input_format: &str) -> Self {
        match input_format {
            EPOCH => InputFormat::Epoch,
            MILLISECONDS => InputFormat::Milliseconds,
            "" => InputFormat::Any,
            pattern => InputFormat::Pattern(DatePattern::compile(pattern)),
        }
    }

    /// Parse a DATE cell
    pub fn parse(&self, value: &Value) -> Option<DateTime<Utc>> {
        match self {
            InputFormat::Epoch => {
                numeric_value(value).and_then(|secs| from_epoch_millis(secs * 1000.0))
            }
            InputFormat::Milliseconds => numeric_value(value).and_then(from_epoch_millis),
            InputFormat::Any => parse_any(value),
            InputFormat::Pattern(pattern) => match value {
                Value::String(s) => pattern.parse(s),
                Value::Number(n) => pattern.parse(&number_text(n)),
                _ => None,
            },
        }
    }
}

/// Parse a DATE cell according to the column's input format
pub fn parse_with_input_format(value: &Value, input_format: &str) -> Option<DateTime<Utc>> {
    InputFormat::new(input_format).parse(value)
}

/// Resolve the output pattern of a DATE column
pub fn output_pattern<'a>(input_format: &'a str, output_format: &'a str) -> &'a str {
    let is_epoch = input_format == EPOCH || input_format == MILLISECONDS;
    if output_format == SAME_AS_INPUT || output_format.is_empty() {
        if is_epoch || input_format.is_empty() {
            ISO_PATTERN
        } else {
            input_format
        }
    } else {
        output_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde_json::json;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_compile_common_patterns() {
        let dt = utc(2021, 3, 2, 14, 5);
        assert_eq!(DatePattern::compile("YYYY-MM-DD").format(&dt), "2021-03-02");
        assert_eq!(DatePattern::compile("DD/MM/YYYY HH:mm").format(&dt), "02/03/2021 14:05");
        assert_eq!(DatePattern::compile("Do MMM YYYY").format(&dt), "2nd Mar 2021");
        assert_eq!(DatePattern::compile("LL").format(&dt), "March 2, 2021");
        assert_eq!(DatePattern::compile("h:mm A").format(&dt), "2:05 PM");
        assert_eq!(DatePattern::compile("[Day] D").format(&dt), "Day 2");
    }

    #[test]
    fn test_percent_is_literal() {
        let dt = utc(2021, 3, 2, 0, 0);
        assert_eq!(DatePattern::compile("YYYY%").format(&dt), "2021%");
    }

    #[test]
    fn test_ordinal_suffixes() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(23), "23rd");
        assert_eq!(ordinal(113), "113th");
    }

    #[test]
    fn test_parse_with_pattern() {
        let p = DatePattern::compile("DD/MM/YYYY");
        assert_eq!(p.parse("02/03/2021"), Some(utc(2021, 3, 2, 0, 0)));
        let p = DatePattern::compile("Do MMM YYYY");
        assert_eq!(p.parse("2nd Mar 2021"), Some(utc(2021, 3, 2, 0, 0)));
        let p = DatePattern::compile("YYYY-MM-DD HH:mm");
        assert_eq!(p.parse("2021-03-02 14:05"), Some(utc(2021, 3, 2, 14, 5)));
        assert_eq!(p.parse("not a date"), None);
    }

    #[test]
    fn test_parse_any() {
        assert_eq!(parse_any(&json!(0)), Some(utc(1970, 1, 1, 0, 0)));
        assert_eq!(
            parse_any(&json!("2021-03-02T14:05:00Z")),
            Some(utc(2021, 3, 2, 14, 5))
        );
        assert_eq!(parse_any(&json!("2021-03-02")), Some(utc(2021, 3, 2, 0, 0)));
        assert_eq!(parse_any(&json!("garbage")), None);
        assert_eq!(parse_any(&json!(true)), None);
    }

    #[test]
    fn test_epoch_input_formats() {
        assert_eq!(
            parse_with_input_format(&json!(86400), EPOCH),
            Some(utc(1970, 1, 2, 0, 0))
        );
        assert_eq!(
            parse_with_input_format(&json!(86_400_000), MILLISECONDS),
            Some(utc(1970, 1, 2, 0, 0))
        );
        assert_eq!(parse_with_input_format(&json!("abc"), EPOCH), None);
    }

    #[test]
    fn test_partial_patterns_default_missing_fields() {
        let this_year = Utc::now().year();
        assert_eq!(
            DatePattern::compile("MMMM YYYY").parse("March 2021"),
            Some(utc(2021, 3, 1, 0, 0))
        );
        assert_eq!(DatePattern::compile("YYYY").parse("2021"), Some(utc(2021, 1, 1, 0, 0)));
        assert_eq!(
            DatePattern::compile("DD/MM").parse("02/03"),
            Some(utc(this_year, 3, 2, 0, 0))
        );
        assert_eq!(
            DatePattern::compile("hh:mm").parse("02:05").map(|dt| dt.hour()),
            Some(2)
        );
    }

    #[test]
    fn test_formatted_dates_parse_back_to_the_same_text() {
        let dt = utc(2021, 3, 2, 14, 5);
        let patterns = [
            "YYYY-MM-DD",
            "DD/MM/YYYY HH:mm",
            "DD/MM/YY",
            "Do MMM YYYY",
            "LL",
            "LLL",
            "LLLL",
            "h:mm A",
            "HH:mm",
            "X",
            "MMMM YYYY",
            "YYYY-MM",
            "DD/MM",
            "MMM D",
            "YYYY",
            ISO_PATTERN,
        ];
        for pattern in patterns {
            let compiled = DatePattern::compile(pattern);
            let text = compiled.format(&dt);
            let reparsed = compiled.parse(&text);
            assert_eq!(
                reparsed.map(|d| compiled.format(&d)),
                Some(text.clone()),
                "{} did not round-trip {:?}",
                pattern,
                text
            );
        }
    }

    #[test]
    fn test_input_format_is_compiled_once() {
        let format = InputFormat::new("DD/MM/YYYY");
        assert!(matches!(format, InputFormat::Pattern(_)));
        assert_eq!(format.parse(&json!("02/03/2021")), Some(utc(2021, 3, 2, 0, 0)));
        assert_eq!(format.parse(&json!(true)), None);
        assert_eq!(InputFormat::new(""), InputFormat::Any);
        assert_eq!(InputFormat::new(EPOCH), InputFormat::Epoch);
    }

    #[test]
    fn test_output_pattern_resolution() {
        assert_eq!(output_pattern("YYYY-MM-DD", SAME_AS_INPUT), "YYYY-MM-DD");
        assert_eq!(output_pattern(EPOCH, SAME_AS_INPUT), ISO_PATTERN);
        assert_eq!(output_pattern(EPOCH, "DD/MM/YYYY"), "DD/MM/YYYY");
    }
}
