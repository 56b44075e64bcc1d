use thiserror::Error;

/// Errors raised while compiling or evaluating filter clauses.
///
/// Every variant aborts the run; rows are never skipped on error.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("operator '{operator}' is not allowed for field '{field}'")]
    UnknownOperator { field: String, operator: String },

    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("not an integer: '{0}'")]
    InvalidNumber(String),

    #[error("expected an 'id;label' value, got '{0}'")]
    MalformedComposite(String),

    #[error("field '{field}' does not hold {expected}")]
    ShapeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("row {row}: document is not valid JSON: {source}")]
    InvalidDocument {
        row: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, FilterError>;
