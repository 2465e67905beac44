//! Field helpers shared by both access styles
//!
//! Id normalization, filter matching and timestamps.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Field every flat record and structured item carries its id in
pub const ID_FIELD: &str = "id";

/// Generate a fresh record / item id (UUID v4)
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Normalize an id value into the string used as a storage key
///
/// Strings are used as-is, numbers and booleans by their JSON text.
/// `null`, empty strings, arrays and objects are not usable ids.
pub fn normalize_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Normalized id of a JSON object, if it carries a usable one
pub fn object_id(object: &Map<String, Value>) -> Option<String> {
    object.get(ID_FIELD).and_then(normalize_id)
}

/// String form a value is compared by when filtering
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Permissive equality filter
///
/// A record is excluded only when a filter key is present in the record
/// and the record's value differs from the filter value. Keys the record
/// lacks never exclude it.
pub fn matches_filters(record: &Value, filters: &HashMap<String, String>) -> bool {
    let Some(fields) = record.as_object() else {
        return true;
    };

    filters.iter().all(|(key, expected)| match fields.get(key) {
        Some(actual) => display_value(actual) == *expected,
        None => true,
    })
}

/// Whether a body counts as missing (`null`, `false`, `0`, `""`, `{}`, `[]`)
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Current UTC time, RFC 3339 with millisecond precision
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
