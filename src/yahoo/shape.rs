//! Shape decoding for fantasy API payloads.
//!
//! The API serializes the same logical object in several ways depending on
//! cardinality and endpoint:
//!
//! - a record as a keyed object: `{"team_key": "...", "name": "..."}`
//! - a record as fragments: `[[{"team_key": "..."}, {"name": "..."}], {"team_stats": {...}}]`
//! - a collection as an indexed object: `{"0": {"team": ...}, "1": {...}, "count": 2}`
//! - a collection as an array: `[{"team": ...}, {"team": ...}]`
//! - a collection under its item key: `{"team": [...]}` or `{"team": {...}}` for one item
//!
//! Everything downstream works on [`Fields`] and [`collection`] so shape checks
//! live only here.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Top-level shape of a JSON node.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Keyed(&'a Map<String, Value>),
    Fragments(&'a [Value]),
    Scalar(&'a Value),
}

impl<'a> Shape<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Shape::Keyed(map),
            Value::Array(items) => Shape::Fragments(items),
            other => Shape::Scalar(other),
        }
    }
}

/// Flattened view of one record, whichever shape it arrived in.
pub type Fields<'a> = BTreeMap<&'a str, &'a Value>;

fn is_index(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// Flatten a record into a single field map.
///
/// Numeric-keyed wrappers inside a keyed record (`"0": {"players": ...}`) are
/// merged into the record. The first occurrence of a field wins.
pub fn fields(value: &Value) -> Fields<'_> {
    let mut out = Fields::new();
    collect_fields(value, &mut out);
    out
}

fn collect_fields<'a>(value: &'a Value, out: &mut Fields<'a>) {
    match Shape::of(value) {
        Shape::Keyed(map) => {
            for (k, v) in map {
                if is_index(k) && (v.is_object() || v.is_array()) {
                    collect_fields(v, out);
                } else {
                    out.entry(k.as_str()).or_insert(v);
                }
            }
        }
        Shape::Fragments(items) => {
            for item in items {
                collect_fields(item, out);
            }
        }
        Shape::Scalar(_) => {}
    }
}

/// Whether an array is a single record split into fragments rather than a
/// list of records.
///
/// Fragments are single-key objects. When the record opens with a nested
/// metadata array, the objects after it may carry several keys each
/// (`{"team_stats": ..., "team_points": ...}`). No key may appear twice.
fn is_fragment_record(items: &[Value]) -> bool {
    fn walk<'a>(items: &'a [Value], seen: &mut BTreeSet<&'a str>, extensions: bool) -> bool {
        for item in items {
            match item {
                Value::Array(inner) => {
                    if !walk(inner, seen, false) {
                        return false;
                    }
                }
                Value::Object(map) if map.len() == 1 || (extensions && !map.is_empty()) => {
                    if !map.keys().all(|key| seen.insert(key.as_str())) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }

    let extensions = items.first().is_some_and(Value::is_array);
    let mut seen = BTreeSet::new();
    walk(items, &mut seen, extensions) && !seen.is_empty()
}

fn unwrap_item<'a>(value: &'a Value, item: &str) -> &'a Value {
    match value {
        Value::Object(map) if map.len() == 1 => map.get(item).unwrap_or(value),
        _ => value,
    }
}

/// Items of a collection in the order the API returned them.
///
/// `item` is the singular element key (`"team"` for `"teams"`).
pub fn collection<'a>(value: &'a Value, item: &str) -> Vec<&'a Value> {
    match Shape::of(value) {
        Shape::Keyed(map) => {
            let mut indexed: Vec<(usize, &Value)> = map
                .iter()
                .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
                .collect();
            if !indexed.is_empty() {
                indexed.sort_by_key(|(i, _)| *i);
                return indexed
                    .into_iter()
                    .map(|(_, v)| unwrap_item(v, item))
                    .collect();
            }

            match map.get(item) {
                Some(Value::Array(items)) if is_fragment_record(items) => {
                    vec![map.get(item).unwrap_or(value)]
                }
                Some(Value::Array(items)) => items.iter().map(|v| unwrap_item(v, item)).collect(),
                Some(Value::Null) | None => Vec::new(),
                Some(single) => vec![single],
            }
        }
        Shape::Fragments(items) => items.iter().map(|v| unwrap_item(v, item)).collect(),
        Shape::Scalar(_) => Vec::new(),
    }
}

/// Depth-first search for the first value stored under `key`.
pub fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(v) = map.get(key) {
                return Some(v);
            }
            map.values().find_map(|v| find_key(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_key(v, key)),
        _ => None,
    }
}

/// The collection's own `count` attribute, if reported.
pub fn reported_count(value: &Value) -> Option<usize> {
    value.as_object()?.get("count").and_then(as_usize)
}

/// The collection's own `total` attribute, if reported.
pub fn reported_total(value: &Value) -> Option<usize> {
    value.as_object()?.get("total").and_then(as_usize)
}

fn as_usize(v: &Value) -> Option<usize> {
    match v {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-empty text of a field; numbers are rendered as text.
pub fn text(fields: &Fields<'_>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Unsigned integer field given as a number or numeric text.
pub fn uint(fields: &Fields<'_>, key: &str) -> Option<u32> {
    match fields.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Boolean flag given as `1`/`"1"`/`true`. Anything else is false.
pub fn flag(fields: &Fields<'_>, key: &str) -> bool {
    match fields.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}

/// Nested record under `key`, flattened. Empty when absent.
pub fn sub_fields<'a>(fields: &Fields<'a>, key: &str) -> Fields<'a> {
    fields.get(key).map(|v| self::fields(v)).unwrap_or_default()
}
