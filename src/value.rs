// 🧱 Raw Values - Schema-less rows as returned by the table store
//
// A row is a map of string keys to a small closed set of value shapes.
// Nothing about the shape is trusted: the resolver pattern-matches on
// the variant instead of probing types ad hoc.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// RAW VALUE
// ============================================================================

/// One cell of a raw row.
///
/// Variant order matters for `#[serde(untagged)]`: `Bool` has to be tried
/// before `Number` so `true` never ends up as `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RawValue>),
    Map(RawRecord),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Borrow the text if this is a `Text` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the nested record if this is a `Map` value
    pub fn as_map(&self) -> Option<&RawRecord> {
        match self {
            RawValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null),
            serde_json::Value::String(s) => RawValue::Text(s),
            serde_json::Value::Array(items) => {
                RawValue::List(items.into_iter().map(RawValue::from).collect())
            }
            serde_json::Value::Object(map) => RawValue::Map(RawRecord::from(map)),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

// ============================================================================
// RAW RECORD
// ============================================================================

/// A schema-less row.
///
/// Keys are kept sorted so the canonical serialization (used for synthetic
/// ids) does not depend on the order the store returned columns in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        RawRecord::default()
    }

    /// Look up a key; a present `Null` is reported as absent
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder: add a field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Stable JSON rendering with sorted keys
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(&self.fields).unwrap_or_default()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RawRecord {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        RawRecord {
            fields: map.into_iter().map(|(k, v)| (k, RawValue::from(v))).collect(),
        }
    }
}

impl FromIterator<(String, RawValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        RawRecord {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Convert a JSON value into a record list.
///
/// Returns `None` when the payload is not an array. Non-object array
/// elements are skipped.
pub fn records_from_json(value: serde_json::Value) -> Option<Vec<RawRecord>> {
    match value {
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::Object(map) => Some(RawRecord::from(map)),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
