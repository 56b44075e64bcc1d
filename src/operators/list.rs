//! Operators for fields holding a list of `"id;label"` values, such as
//! people or subject assignments.
//!
//! A list matches when at least one element does. Unlike the scalar set,
//! `regex` and `contains` look at the raw element, and the comparison
//! operators compare the id part as *text*.

use regex::Regex;

use super::{Operand, OperatorFn, CONTAINS, EQUAL_TO, GREATER_THAN, LESS_THAN, REGEX};
use crate::document::{Composite, FieldValue};
use crate::error::Result;

pub(crate) const OPERATORS: &[(&str, OperatorFn)] = &[
    (REGEX, apply_regex),
    (CONTAINS, apply_contains),
    (EQUAL_TO, apply_equal_to),
    (GREATER_THAN, apply_greater_than),
    (LESS_THAN, apply_less_than),
];

pub fn regex(values: &[Composite<'_>], pattern: &Regex) -> bool {
    values
        .iter()
        .any(|v| pattern.is_match(&v.raw().to_lowercase()))
}

pub fn contains(values: &[Composite<'_>], content: &str) -> bool {
    values
        .iter()
        .any(|v| v.raw().to_lowercase().contains(content))
}

/// True iff `content` equals the label or the id of any element, ignoring case.
pub fn equal_to(values: &[Composite<'_>], content: &str) -> Result<bool> {
    let content = content.to_lowercase();
    for value in values {
        let (id, label) = value.parts()?;
        if label.to_lowercase() == content || id.to_lowercase() == content {
            return Ok(true);
        }
    }
    Ok(false)
}

/// True iff `content` sorts before the id of any element.
pub fn greater_than(values: &[Composite<'_>], content: &str) -> Result<bool> {
    any_id(values, |id| content < id)
}

/// True iff `content` sorts after the id of any element.
pub fn less_than(values: &[Composite<'_>], content: &str) -> Result<bool> {
    any_id(values, |id| content > id)
}

fn any_id(values: &[Composite<'_>], pred: impl Fn(&str) -> bool) -> Result<bool> {
    for value in values {
        if pred(value.id()?) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn as_list<'v, 'a>(value: &'v FieldValue<'a>) -> &'v [Composite<'a>] {
    match value {
        FieldValue::List(values) => values,
        _ => &[],
    }
}

fn apply_regex(value: &FieldValue<'_>, operand: &Operand) -> Result<bool> {
    let values = as_list(value);
    if values.is_empty() {
        return Ok(false);
    }
    let pattern = operand.pattern()?;
    Ok(regex(values, &pattern))
}

fn apply_contains(value: &FieldValue<'_>, operand: &Operand) -> Result<bool> {
    Ok(contains(as_list(value), operand.text()))
}

fn apply_equal_to(value: &FieldValue<'_>, operand: &Operand) -> Result<bool> {
    equal_to(as_list(value), operand.text())
}

fn apply_greater_than(value: &FieldValue<'_>, operand: &Operand) -> Result<bool> {
    greater_than(as_list(value), operand.text())
}

fn apply_less_than(value: &FieldValue<'_>, operand: &Operand) -> Result<bool> {
    less_than(as_list(value), operand.text())
}
