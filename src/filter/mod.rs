use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::Document;
use crate::error::Result;
use crate::fields::{FieldRegistry, FieldSpec};
use crate::operators::{Operand, OperatorFn, EQUAL_TO, NOT_EQUAL_TO};

/// Clause value that turns `equalTo` / `notEqualTo` into a presence check.
pub const NULL: &str = "null";

/// One `field operator value` instruction as given by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl Clause {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.field, self.operator, self.value)
    }
}

/// How per-clause results are combined for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every clause must match; an empty clause list matches.
    #[default]
    And,
    /// At least one clause must match; an empty clause list does not.
    Or,
}

impl MatchMode {
    pub fn reduce(self, results: impl IntoIterator<Item = bool>) -> bool {
        let mut results = results.into_iter();
        match self {
            MatchMode::And => results.all(|r| r),
            MatchMode::Or => results.any(|r| r),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::And => f.write_str("and"),
            MatchMode::Or => f.write_str("or"),
        }
    }
}

enum Check {
    IsNull,
    IsNotNull,
    Apply(OperatorFn, Operand),
}

/// A clause resolved against the registry: field, operator and operand are
/// looked up (and any regex compiled) once, before the first row.
pub struct CompiledClause<'r> {
    field: &'r FieldSpec,
    check: Check,
}

impl<'r> CompiledClause<'r> {
    pub fn compile(registry: &'r FieldRegistry, clause: &Clause) -> Result<Self> {
        let field = registry.resolve_label(&clause.field)?;
        let value = clause.value.to_lowercase();

        let check = match clause.operator.as_str() {
            EQUAL_TO if value == NULL => Check::IsNull,
            NOT_EQUAL_TO if value == NULL => Check::IsNotNull,
            name => Check::Apply(field.operator(name)?, Operand::new(name, &value)?),
        };

        tracing::debug!(clause = %clause, key = %field.key, shape = ?field.shape, "compiled clause");
        Ok(Self { field, check })
    }

    pub fn field(&self) -> &FieldSpec {
        self.field
    }

    /// Evaluate against one document. Absent or empty fields never reach the
    /// operator: they satisfy only an `equalTo null` check.
    pub fn evaluate(&self, document: &Document) -> Result<bool> {
        match &self.check {
            Check::IsNull => Ok(!document.has(&self.field.key)),
            Check::IsNotNull => Ok(document.has(&self.field.key)),
            Check::Apply(operator, operand) => {
                let value = document.field(self.field)?;
                if value.is_absent() {
                    return Ok(false);
                }
                operator(&value, operand)
            }
        }
    }
}

/// All clauses of a run plus the mode that combines them.
pub struct Filter<'r> {
    clauses: Vec<CompiledClause<'r>>,
    mode: MatchMode,
}

impl<'r> Filter<'r> {
    pub fn compile(registry: &'r FieldRegistry, clauses: &[Clause], mode: MatchMode) -> Result<Self> {
        let clauses = clauses
            .iter()
            .map(|clause| CompiledClause::compile(registry, clause))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { clauses, mode })
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Every clause is evaluated, so an error in any of them surfaces even
    /// when the combined result is already decided.
    pub fn matches(&self, document: &Document) -> Result<bool> {
        let results = self
            .clauses
            .iter()
            .map(|clause| clause.evaluate(document))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.mode.reduce(results))
    }
}

/// Evaluate a single clause against a document.
///
/// The clause is compiled before the document is looked at, so an unknown
/// field, an unknown operator or a bad pattern is an error even when the
/// document lacks the field. Only a valid clause short-circuits to `false`
/// on an absent field.
pub fn evaluate(
    registry: &FieldRegistry,
    document: &Document,
    field_label: &str,
    operator: &str,
    raw_value: &str,
) -> Result<bool> {
    CompiledClause::compile(registry, &Clause::new(field_label, operator, raw_value))?
        .evaluate(document)
}

/// Evaluate every clause against a document and combine the results.
pub fn combine(
    registry: &FieldRegistry,
    document: &Document,
    clauses: &[Clause],
    mode: MatchMode,
) -> Result<bool> {
    Filter::compile(registry, clauses, mode)?.matches(document)
}
