use serde_json::{Map, Value};

use crate::error::{FilterError, Result};
use crate::fields::{FieldShape, FieldSpec};

/// A single backup document, decoded from the JSON column of one CSV row.
/// Provides field lookups without dealing with raw JSON at the call sites.
#[derive(Clone, Debug, Default)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Parse the embedded JSON text of the row identified by `row`.
    pub fn parse(row: &str, text: &str) -> Result<Self> {
        serde_json::from_str::<Map<String, Value>>(text)
            .map(Self)
            .map_err(|source| FilterError::InvalidDocument {
                row: row.to_string(),
                source,
            })
    }

    /// Create from a JSON value; `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Check if a field exists and holds a non-empty value
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !is_falsy(v))
    }

    /// Decode a field according to its declared shape.
    ///
    /// Falsy JSON (`null`, `""`, `0`, `false`, `[]`, `{}`) decodes to
    /// [`FieldValue::Absent`]; anything else must match the shape.
    pub fn field(&self, spec: &FieldSpec) -> Result<FieldValue<'_>> {
        let value = match self.get(&spec.key) {
            Some(v) if !is_falsy(v) => v,
            _ => return Ok(FieldValue::Absent),
        };

        let mismatch = || FilterError::ShapeMismatch {
            field: spec.key.clone(),
            expected: spec.shape.describe(),
        };

        match (spec.shape, value) {
            (FieldShape::Text, Value::String(s)) => Ok(FieldValue::Text(s)),
            (FieldShape::Composite, Value::String(s)) => Ok(FieldValue::Composite(Composite(s))),
            (FieldShape::List, Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(Composite).ok_or_else(mismatch))
                .collect::<Result<Vec<_>>>()
                .map(FieldValue::List),
            (FieldShape::Mapping, Value::Object(map)) => Ok(FieldValue::Mapping(map)),
            _ => Err(mismatch()),
        }
    }
}

/// Python-style truthiness of a JSON value, inverted.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// A document field decoded by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Absent,
    Text(&'a str),
    Composite(Composite<'a>),
    List(Vec<Composite<'a>>),
    Mapping(&'a Map<String, Value>),
}

impl FieldValue<'_> {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

/// An `"<id>;<label>"` value, split on demand. Only operators that need a
/// part fail on text without a `;`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Composite<'a>(&'a str);

impl<'a> Composite<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &'a str {
        self.0
    }

    /// Split on the first `;` into (id, label).
    pub fn parts(&self) -> Result<(&'a str, &'a str)> {
        self.0
            .split_once(';')
            .ok_or_else(|| FilterError::MalformedComposite(self.0.to_string()))
    }

    pub fn id(&self) -> Result<&'a str> {
        self.parts().map(|(id, _)| id)
    }

    pub fn label(&self) -> Result<&'a str> {
        self.parts().map(|(_, label)| label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(key: &str, shape: FieldShape) -> FieldSpec {
        FieldSpec::new(key, key, shape)
    }

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn composite_splits_on_first_semicolon() {
        let c = Composite::new("12;Aarhus;Centrum");
        assert_eq!(c.id().unwrap(), "12");
        assert_eq!(c.label().unwrap(), "Aarhus;Centrum");
    }

    #[test]
    fn composite_without_separator_is_an_error() {
        let err = Composite::new("Aarhus").label().unwrap_err();
        assert!(matches!(err, FilterError::MalformedComposite(ref s) if s == "Aarhus"));
    }

    #[test]
    fn falsy_values_decode_as_absent() {
        let d = doc(json!({
            "a": null, "b": "", "c": [], "d": {}, "e": 0, "f": false
        }));
        for key in ["a", "b", "c", "d", "e", "f", "missing"] {
            assert!(!d.has(key), "{key} should be falsy");
            assert!(d.field(&spec(key, FieldShape::Text)).unwrap().is_absent());
        }
    }

    #[test]
    fn decodes_by_declared_shape() {
        let d = doc(json!({
            "collection": "1;Aarhus Stadsarkiv",
            "people": ["5;Alpha", "6;Beta"],
            "admin_data": {"Bestillingsinformation": "negativsamlingen 1970"}
        }));

        assert_eq!(
            d.field(&spec("collection", FieldShape::Composite)).unwrap(),
            FieldValue::Composite(Composite::new("1;Aarhus Stadsarkiv"))
        );
        assert_eq!(
            d.field(&spec("people", FieldShape::List)).unwrap(),
            FieldValue::List(vec![Composite::new("5;Alpha"), Composite::new("6;Beta")])
        );
        assert!(matches!(
            d.field(&spec("admin_data", FieldShape::Mapping)).unwrap(),
            FieldValue::Mapping(m) if m.len() == 1
        ));
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let d = doc(json!({"people": "5;Alpha", "tags": ["ok;1", 7]}));
        assert!(matches!(
            d.field(&spec("people", FieldShape::List)),
            Err(FilterError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            d.field(&spec("tags", FieldShape::List)),
            Err(FilterError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert!(Document::parse("7", "[1, 2]").is_err());
        let err = Document::parse("7", "{not json").unwrap_err();
        assert!(err.to_string().starts_with("row 7:"));
    }
}
