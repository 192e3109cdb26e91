// 🔎 Field Resolver - Typed extraction from loosely named rows
//
// The same logical field shows up under different keys depending on the
// table, the integration that wrote the row, or the year it was written.
// Callers pass candidate keys ordered from most to least specific; the
// first candidate that coerces to the requested kind wins.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::value::{RawRecord, RawValue};

// ============================================================================
// KINDS
// ============================================================================

/// Semantic type requested from the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    List,
    Bool,
}

/// A resolved, coerced value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resolved {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
    List(Vec<String>),
    Bool(bool),
}

/// Resolve the first candidate key that coerces to `kind`.
///
/// Lists resolve to `None` rather than an empty list so "absent" stays
/// distinguishable here; [`string_list`] flattens that to `Vec::new()`.
pub fn resolve(record: &RawRecord, keys: &[&str], kind: FieldKind) -> Option<Resolved> {
    match kind {
        FieldKind::Text => string(record, keys).map(Resolved::Text),
        FieldKind::Number => number(record, keys).map(Resolved::Number),
        FieldKind::Date => date(record, keys).map(Resolved::Date),
        FieldKind::Bool => boolean(record, keys).map(Resolved::Bool),
        FieldKind::List => {
            let list = string_list(record, keys);
            if list.is_empty() {
                None
            } else {
                Some(Resolved::List(list))
            }
        }
    }
}

fn first_match<T>(
    record: &RawRecord,
    keys: &[&str],
    coerce: impl Fn(&RawValue) -> Option<T>,
) -> Option<T> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find_map(coerce)
}

// ============================================================================
// TYPED HELPERS
// ============================================================================

pub fn string(record: &RawRecord, keys: &[&str]) -> Option<String> {
    first_match(record, keys, text_value)
}

pub fn number(record: &RawRecord, keys: &[&str]) -> Option<f64> {
    first_match(record, keys, number_value)
}

pub fn date(record: &RawRecord, keys: &[&str]) -> Option<DateTime<Utc>> {
    first_match(record, keys, date_value)
}

pub fn boolean(record: &RawRecord, keys: &[&str]) -> Option<bool> {
    first_match(record, keys, bool_value)
}

/// First candidate producing a non-empty list, or an empty list
pub fn string_list(record: &RawRecord, keys: &[&str]) -> Vec<String> {
    first_match(record, keys, |value| {
        let list = list_value(value);
        if list.is_empty() {
            None
        } else {
            Some(list)
        }
    })
    .unwrap_or_default()
}

// ============================================================================
// VALUE COERCIONS
// ============================================================================

/// Non-empty trimmed text, or a finite number in its shortest form
pub fn text_value(value: &RawValue) -> Option<String> {
    match value {
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        RawValue::Number(n) if n.is_finite() => Some(format_number(*n)),
        _ => None,
    }
}

/// Finite number, or text that parses once `$`, `,` and whitespace are gone
pub fn number_value(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Number(n) if n.is_finite() => Some(*n),
        RawValue::Text(s) => parse_amount(s),
        _ => None,
    }
}

pub fn date_value(value: &RawValue) -> Option<DateTime<Utc>> {
    match value {
        RawValue::Number(n) if n.is_finite() => from_epoch_millis(*n),
        RawValue::Text(s) => parse_date(s),
        _ => None,
    }
}

pub fn bool_value(value: &RawValue) -> Option<bool> {
    match value {
        RawValue::Bool(b) => Some(*b),
        RawValue::Number(n) if n.is_finite() => Some(*n != 0.0),
        RawValue::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "x" | "done" | "complete" | "completed" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn list_value(value: &RawValue) -> Vec<String> {
    match value {
        RawValue::List(items) => items
            .iter()
            .filter_map(|item| match item {
                RawValue::Text(s) => non_empty(s),
                _ => None,
            })
            .collect(),
        RawValue::Text(s) => s
            .split(|c: char| c == ',' || c == '\n')
            .filter_map(non_empty)
            .collect(),
        RawValue::Map(map) => map
            .iter()
            .filter_map(|(_, v)| v.as_text().and_then(non_empty))
            .collect(),
        _ => Vec::new(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Render a number the way a person would type it: `42`, not `42.0`
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Parse "$1,250.00"-style amounts
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn from_epoch_millis(ms: f64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms.trunc() as i64).single()
}

/// Parse a date string into UTC.
///
/// Accepted forms, tried in order:
/// - RFC 3339 / ISO-8601 with offset ("2025-01-01T10:00:00Z")
/// - RFC 2822 ("Wed, 01 Jan 2025 10:00:00 +0000")
/// - SQL timestamps with offset ("2025-01-01 10:00:00+00")
/// - Naive date-times, read as UTC ("2025-01-01 10:00", "2025-01-01T10:00:00")
/// - Plain dates ("2025-01-01", "01/31/2025") at midnight UTC
/// - All-digit strings of at least 10 digits as epoch milliseconds
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.len() >= 10 && s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse::<f64>().ok().and_then(from_epoch_millis);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(day) = NaiveDate::parse_from_str(s, fmt) {
            return day.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
        }
    }

    None
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        match RawValue::from(value) {
            RawValue::Map(m) => m,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_string_respects_candidate_order() {
        let r = record(json!({"client_name": "Maya", "name": "Other"}));
        let name = string(&r, &["client_name", "client", "customer", "name"]);

        assert_eq!(name, Some("Maya".to_string()));
    }

    #[test]
    fn test_string_skips_blank_and_non_text() {
        let r = record(json!({"a": "   ", "b": true, "c": " Luna "}));

        assert_eq!(string(&r, &["a", "b", "c"]), Some("Luna".to_string()));
    }

    #[test]
    fn test_string_from_number() {
        let r = record(json!({"id": 42, "ratio": 1.5}));

        assert_eq!(string(&r, &["id"]), Some("42".to_string()));
        assert_eq!(string(&r, &["ratio"]), Some("1.5".to_string()));
    }

    #[test]
    fn test_number_strips_currency_and_separators() {
        let r = record(json!({"total": " $1,250.50 ", "bad": "abc", "n": 7}));

        assert_eq!(number(&r, &["total"]), Some(1250.50));
        assert_eq!(number(&r, &["bad", "n"]), Some(7.0));
        assert_eq!(number(&r, &["bad"]), None);
    }

    #[test]
    fn test_number_rejects_non_finite_text() {
        let r = record(json!({"a": "NaN", "b": "inf", "c": "$"}));

        assert_eq!(number(&r, &["a", "b", "c"]), None);
    }

    #[test]
    fn test_date_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let r = record(json!({
            "iso": "2025-01-01T00:00:00Z",
            "offset": "2025-01-01T02:00:00+02:00",
            "plain": "2025-01-01",
            "us": "01/01/2025",
            "sql": "2025-01-01 00:00:00+00",
            "ms": 1735689600000_i64,
            "ms_text": "1735689600000"
        }));

        for key in ["iso", "offset", "plain", "us", "sql", "ms", "ms_text"] {
            assert_eq!(date(&r, &[key]), Some(expected), "key {}", key);
        }
    }

    #[test]
    fn test_date_skips_invalid_candidates() {
        let r = record(json!({"created": "not a date", "created_at": "2025-03-04T05:06:07Z"}));
        let dt = date(&r, &["created", "created_at"]).unwrap();

        assert_eq!(dt.to_rfc3339(), "2025-03-04T05:06:07+00:00");
    }

    #[test]
    fn test_string_list_shapes() {
        let r = record(json!({
            "list": [" Bath ", "", 3, "Nails"],
            "csv": "Bath, Nails\nTeeth",
            "map": {"a": "Bath", "b": "  ", "c": 2},
            "empty": [],
            "num": 5
        }));

        assert_eq!(string_list(&r, &["list"]), vec!["Bath", "Nails"]);
        assert_eq!(string_list(&r, &["csv"]), vec!["Bath", "Nails", "Teeth"]);
        assert_eq!(string_list(&r, &["map"]), vec!["Bath"]);
        assert!(string_list(&r, &["num"]).is_empty());
        assert_eq!(string_list(&r, &["empty", "csv"]).len(), 3);
        assert!(string_list(&r, &["missing"]).is_empty());
    }

    #[test]
    fn test_boolean() {
        let r = record(json!({"a": "Yes", "b": 0, "c": "maybe", "d": false}));

        assert_eq!(boolean(&r, &["a"]), Some(true));
        assert_eq!(boolean(&r, &["b"]), Some(false));
        assert_eq!(boolean(&r, &["c", "d"]), Some(false));
    }

    #[test]
    fn test_resolve_dispatch() {
        let r = record(json!({"amount": "12", "tags": ""}));

        assert_eq!(
            resolve(&r, &["amount"], FieldKind::Number),
            Some(Resolved::Number(12.0))
        );
        assert_eq!(resolve(&r, &["tags"], FieldKind::List), None);
        assert_eq!(
            resolve(&r, &["amount"], FieldKind::Text),
            Some(Resolved::Text("12".to_string()))
        );
    }
}
