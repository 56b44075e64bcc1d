//! Operators for dictionary fields such as administrative and descriptive
//! data, where each key names a sub-field.
//!
//! `contains` accepts either a bare needle, searched in every value, or
//! `key:needle`, searched only under that key.

use regex::Regex;
use serde_json::{Map, Value};

use super::{Operand, OperatorFn, CONTAINS, HAS_KEY, REGEX};
use crate::document::FieldValue;
use crate::error::Result;

pub(crate) const OPERATORS: &[(&str, OperatorFn)] = &[
    (CONTAINS, apply_contains),
    (HAS_KEY, apply_has_key),
    (REGEX, apply_regex),
];

pub fn has_key(map: &Map<String, Value>, key: &str) -> bool {
    map.keys().any(|k| k.to_lowercase() == key)
}

pub fn contains(map: &Map<String, Value>, content: &str) -> bool {
    match content.split_once(':') {
        Some((key, needle)) => map
            .iter()
            .filter(|(k, _)| k.to_lowercase() == key)
            .any(|(_, v)| value_text(v).contains(needle)),
        None => map.values().any(|v| value_text(v).contains(content)),
    }
}

pub fn regex(map: &Map<String, Value>, pattern: &Regex) -> bool {
    map.values().any(|v| pattern.is_match(&value_text(v)))
}

/// Lower-cased searchable text of a value: strings as-is, anything else
/// as compact JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string().to_lowercase(),
    }
}

fn as_map<'v>(value: &FieldValue<'v>) -> Option<&'v Map<String, Value>> {
    match value {
        FieldValue::Mapping(map) => Some(*map),
        _ => None,
    }
}

fn apply_contains(value: &FieldValue<'_>, operand: &Operand) -> Result<bool> {
    Ok(as_map(value).is_some_and(|map| contains(map, operand.text())))
}

fn apply_has_key(value: &FieldValue<'_>, operand: &Operand) -> Result<bool> {
    Ok(as_map(value).is_some_and(|map| has_key(map, operand.text())))
}

fn apply_regex(value: &FieldValue<'_>, operand: &Operand) -> Result<bool> {
    let Some(map) = as_map(value) else {
        return Ok(false);
    };
    let pattern = operand.pattern()?;
    Ok(regex(map, &pattern))
}
