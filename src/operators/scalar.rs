//! Operators for fields holding a single value: plain text, or an
//! `"id;label"` composite.
//!
//! Numeric operators compare the id part as integers. Text operators are
//! case-insensitive; the operand is already lower-cased.

use regex::Regex;

use super::{
    parse_int, Operand, OperatorFn, CONTAINS, EQUAL_TO, GREATER_THAN, LESS_THAN, NOT_EQUAL_TO,
    REGEX,
};
use crate::document::{Composite, FieldValue};
use crate::error::Result;

pub(crate) const TEXT_OPERATORS: &[(&str, OperatorFn)] =
    &[(REGEX, apply_regex), (CONTAINS, apply_contains)];

pub(crate) const COMPOSITE_OPERATORS: &[(&str, OperatorFn)] = &[
    (REGEX, apply_regex),
    (CONTAINS, apply_contains),
    (EQUAL_TO, apply_equal_to),
    (NOT_EQUAL_TO, apply_not_equal_to),
    (GREATER_THAN, apply_greater_than),
    (LESS_THAN, apply_less_than),
];

/// True iff `pattern` matches somewhere in `text`; empty text never matches.
pub fn regex(text: &str, pattern: &Regex) -> bool {
    !text.is_empty() && pattern.is_match(&text.to_lowercase())
}

/// Substring test on the raw field text.
pub fn contains(value: &str, content: &str) -> bool {
    !value.is_empty() && value.to_lowercase().contains(content)
}

pub fn equal_to(value: Composite<'_>, content: &str) -> Result<bool> {
    compare_id(value, content, |left, right| left == right)
}

pub fn not_equal_to(value: Composite<'_>, content: &str) -> Result<bool> {
    compare_id(value, content, |left, right| left != right)
}

pub fn greater_than(value: Composite<'_>, content: &str) -> Result<bool> {
    compare_id(value, content, |left, right| left > right)
}

pub fn less_than(value: Composite<'_>, content: &str) -> Result<bool> {
    compare_id(value, content, |left, right| left < right)
}

/// Compare the id part against `content` as integers. An empty id part is
/// a non-match and skips parsing entirely.
fn compare_id(value: Composite<'_>, content: &str, cmp: fn(i64, i64) -> bool) -> Result<bool> {
    let id = value.id()?;
    if id.is_empty() {
        return Ok(false);
    }
    Ok(cmp(parse_int(id)?, parse_int(content)?))
}

fn apply_regex(value: &FieldValue<'_>, operand: &Operand) -> Result<bool> {
    let text = match value {
        FieldValue::Text(text) => *text,
        FieldValue::Composite(c) => c.label()?,
        _ => return Ok(false),
    };
    let pattern = operand.pattern()?;
    Ok(regex(text, &pattern))
}

fn apply_contains(value: &FieldValue<'_>, operand: &Operand) -> Result<bool> {
    Ok(match value {
        FieldValue::Text(text) => contains(text, operand.text()),
        FieldValue::Composite(c) => contains(c.raw(), operand.text()),
        _ => false,
    })
}

macro_rules! composite_adapter {
    ($name:ident => $op:ident) => {
        fn $name(value: &FieldValue<'_>, operand: &Operand) -> Result<bool> {
            match value {
                FieldValue::Composite(c) => $op(*c, operand.text()),
                _ => Ok(false),
            }
        }
    };
}

composite_adapter!(apply_equal_to => equal_to);
composite_adapter!(apply_not_equal_to => not_equal_to);
composite_adapter!(apply_greater_than => greater_than);
composite_adapter!(apply_less_than => less_than);
