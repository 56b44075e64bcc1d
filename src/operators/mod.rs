use regex::Regex;
use std::borrow::Cow;

use crate::document::FieldValue;
use crate::error::{FilterError, Result};
use crate::fields::FieldShape;

pub mod list;
pub mod mapping;
pub mod scalar;

pub const REGEX: &str = "regex";
pub const CONTAINS: &str = "contains";
pub const EQUAL_TO: &str = "equalTo";
pub const NOT_EQUAL_TO: &str = "notEqualTo";
pub const GREATER_THAN: &str = "greaterThan";
pub const LESS_THAN: &str = "lessThan";
pub const HAS_KEY: &str = "hasKey";

/// An operator implementation: decoded field value + clause operand -> match.
pub type OperatorFn = fn(&FieldValue<'_>, &Operand) -> Result<bool>;

/// Operator name -> implementation, in listing order.
pub type OperatorTable = &'static [(&'static str, OperatorFn)];

/// The operator set available to fields of the given shape.
pub fn operators_for(shape: FieldShape) -> OperatorTable {
    match shape {
        FieldShape::Text => scalar::TEXT_OPERATORS,
        FieldShape::Composite => scalar::COMPOSITE_OPERATORS,
        FieldShape::List => list::OPERATORS,
        FieldShape::Mapping => mapping::OPERATORS,
    }
}

/// The comparison value of a clause, lower-cased once up front.
/// Regex operands also carry their compiled pattern.
#[derive(Debug, Clone)]
pub struct Operand {
    text: String,
    pattern: Option<Regex>,
}

impl Operand {
    pub fn new(operator: &str, raw: &str) -> Result<Self> {
        let text = raw.to_lowercase();
        let pattern = if operator == REGEX {
            Some(compile(&text)?)
        } else {
            None
        };
        Ok(Self { text, pattern })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The compiled pattern, compiling on demand for operands built for a
    /// non-regex operator.
    pub fn pattern(&self) -> Result<Cow<'_, Regex>> {
        match &self.pattern {
            Some(p) => Ok(Cow::Borrowed(p)),
            None => compile(&self.text).map(Cow::Owned),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| FilterError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Parse clause or id text as an integer, tolerating surrounding whitespace.
pub(crate) fn parse_int(text: &str) -> Result<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| FilterError::InvalidNumber(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_is_lower_cased() {
        let op = Operand::new(CONTAINS, "SALLING").unwrap();
        assert_eq!(op.text(), "salling");
    }

    #[test]
    fn regex_operand_compiles_up_front() {
        let err = Operand::new(REGEX, "(unclosed").unwrap_err();
        assert!(matches!(err, FilterError::InvalidPattern { .. }));
        // Other operators accept arbitrary text.
        assert!(Operand::new(CONTAINS, "(unclosed").is_ok());
    }

    #[test]
    fn every_shape_has_operators() {
        for shape in [
            FieldShape::Text,
            FieldShape::Composite,
            FieldShape::List,
            FieldShape::Mapping,
        ] {
            assert!(!operators_for(shape).is_empty());
        }
    }

    fn lookup(shape: FieldShape, name: &str) -> OperatorFn {
        operators_for(shape)
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
            .unwrap()
    }

    #[test]
    fn regex_dispatches_through_every_table() {
        use crate::document::Composite;
        use serde_json::json;

        let operand = Operand::new(REGEX, "^SALL").unwrap();
        let map = json!({"Titel": "Salling"});
        let map = map.as_object().unwrap();
        let cases = [
            (FieldShape::Text, FieldValue::Text("Salling")),
            (FieldShape::Composite, FieldValue::Composite(Composite::new("1;Salling"))),
            (FieldShape::List, FieldValue::List(vec![Composite::new("salling;1")])),
            (FieldShape::Mapping, FieldValue::Mapping(map)),
        ];
        for (shape, value) in cases {
            assert!(lookup(shape, REGEX)(&value, &operand).unwrap(), "{shape:?}");
        }
    }

    #[test]
    fn pattern_compiles_on_demand_for_other_operators() {
        let operand = Operand::new(CONTAINS, "SALL.NG").unwrap();
        assert!(operand.pattern().unwrap().is_match("salling"));
        let bad = Operand::new(CONTAINS, "(").unwrap();
        assert!(matches!(bad.pattern(), Err(FilterError::InvalidPattern { .. })));
    }

    #[test]
    fn parse_int_trims() {
        assert_eq!(parse_int(" 42 ").unwrap(), 42);
        assert!(matches!(parse_int("4x2"), Err(FilterError::InvalidNumber(_))));
    }
}
