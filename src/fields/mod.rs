use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{FilterError, Result};
use crate::operators::{self, OperatorFn, OperatorTable};

mod defaults;

/// How a field's value is laid out in the backup document. Decides which
/// operator set the field gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldShape {
    /// Free text.
    Text,
    /// A single `"id;label"` string.
    Composite,
    /// A list of `"id;label"` strings.
    List,
    /// A nested dictionary.
    Mapping,
}

impl FieldShape {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldShape::Text => "text",
            FieldShape::Composite => "an 'id;label' string",
            FieldShape::List => "a list of 'id;label' strings",
            FieldShape::Mapping => "a mapping",
        }
    }
}

/// A registered field: user-facing label, document key and shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub label: String,
    pub key: String,
    pub shape: FieldShape,
}

impl FieldSpec {
    pub fn new(label: impl Into<String>, key: impl Into<String>, shape: FieldShape) -> Self {
        Self {
            label: label.into(),
            key: key.into(),
            shape,
        }
    }

    pub fn operators(&self) -> OperatorTable {
        operators::operators_for(self.shape)
    }

    pub fn operator(&self, name: &str) -> Result<OperatorFn> {
        self.operators()
            .iter()
            .find(|(op, _)| *op == name)
            .map(|(_, f)| *f)
            .ok_or_else(|| FilterError::UnknownOperator {
                field: self.label.clone(),
                operator: name.to_string(),
            })
    }

    pub fn operator_names(&self) -> impl Iterator<Item = &'static str> {
        self.operators().iter().map(|(name, _)| *name)
    }
}

/// Label -> key -> operator lookups for every known field.
///
/// Built once per run and shared by reference; there is no way to mutate
/// it after construction.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: Vec<FieldSpec>,
    by_label: HashMap<String, usize>,
    by_key: HashMap<String, usize>,
}

impl FieldRegistry {
    /// Build a registry, rejecting duplicate labels or keys.
    pub fn new(fields: Vec<FieldSpec>) -> anyhow::Result<Self> {
        let mut labels = std::collections::HashSet::new();
        let mut keys = std::collections::HashSet::new();
        for field in &fields {
            if field.label.is_empty() || field.key.is_empty() {
                anyhow::bail!("Field labels and keys must not be empty");
            }
            if !labels.insert(&field.label) {
                anyhow::bail!("Duplicate field label: {}", field.label);
            }
            if !keys.insert(&field.key) {
                anyhow::bail!("Duplicate field key: {}", field.key);
            }
        }
        Ok(Self::indexed(fields))
    }

    fn indexed(fields: Vec<FieldSpec>) -> Self {
        let by_label = fields
            .iter()
            .enumerate()
            .map(|(idx, f)| (f.label.clone(), idx))
            .collect();
        let by_key = fields
            .iter()
            .enumerate()
            .map(|(idx, f)| (f.key.clone(), idx))
            .collect();
        Self {
            fields,
            by_label,
            by_key,
        }
    }

    /// Translate a user-facing label (case-sensitive) to its field.
    pub fn resolve_label(&self, label: &str) -> Result<&FieldSpec> {
        self.by_label
            .get(label)
            .map(|&idx| &self.fields[idx])
            .ok_or_else(|| FilterError::UnknownField(label.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.by_key.get(key).map(|&idx| &self.fields[idx])
    }

    pub fn operator_for(&self, key: &str, operator: &str) -> Result<OperatorFn> {
        self.get(key)
            .ok_or_else(|| FilterError::UnknownField(key.to_string()))?
            .operator(operator)
    }

    /// Fields in registration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}

impl Default for FieldRegistry {
    /// The field table of the archive backup export.
    fn default() -> Self {
        Self::indexed(defaults::builtin_fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{CONTAINS, EQUAL_TO, HAS_KEY, NOT_EQUAL_TO};

    #[test]
    fn builtin_table_is_consistent() {
        let fields = defaults::builtin_fields();
        assert!(FieldRegistry::new(fields).is_ok());
    }

    #[test]
    fn resolves_labels_case_sensitively() {
        let registry = FieldRegistry::default();
        assert_eq!(registry.resolve_label("Samling").unwrap().key, "collection");
        assert!(matches!(
            registry.resolve_label("samling"),
            Err(FilterError::UnknownField(ref l)) if l == "samling"
        ));
    }

    #[test]
    fn operator_lookup_checks_key_then_operator() {
        let registry = FieldRegistry::default();
        assert!(registry.operator_for("collection", EQUAL_TO).is_ok());
        assert!(registry.operator_for("admin_data", HAS_KEY).is_ok());
        assert!(matches!(
            registry.operator_for("nope", CONTAINS),
            Err(FilterError::UnknownField(_))
        ));
        assert!(matches!(
            registry.operator_for("people", NOT_EQUAL_TO),
            Err(FilterError::UnknownOperator { .. })
        ));
        assert!(matches!(
            registry.operator_for("heading", "between"),
            Err(FilterError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn rejects_duplicates() {
        let fields = vec![
            FieldSpec::new("Samling", "collection", FieldShape::Composite),
            FieldSpec::new("Samling", "other", FieldShape::Text),
        ];
        assert!(FieldRegistry::new(fields).is_err());

        let fields = vec![
            FieldSpec::new("A", "same", FieldShape::Composite),
            FieldSpec::new("B", "same", FieldShape::Text),
        ];
        assert!(FieldRegistry::new(fields).is_err());
    }

    #[test]
    fn shape_deserializes_lowercase() {
        let spec: FieldSpec =
            serde_yaml::from_str("{ label: Personer, key: people, shape: list }").unwrap();
        assert_eq!(spec.shape, FieldShape::List);
    }
}
