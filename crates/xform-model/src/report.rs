//! Validation report value objects.
//!
//! Field names and `error_type` wire values are a public contract consumed
//! by the report writer and the cell highlighter; renaming them requires a
//! compatibility note.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a reported problem.
///
/// Serialized forms are wire-visible: `type_mismatch`,
/// `error_constraint_unsatisfied`, `error_value_required`,
/// `unmatched_column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TypeMismatch,
    ErrorConstraintUnsatisfied,
    ErrorValueRequired,
    /// Informational: a column header matched no question name or label.
    UnmatchedColumn,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::ErrorConstraintUnsatisfied => "error_constraint_unsatisfied",
            ErrorKind::ErrorValueRequired => "error_value_required",
            ErrorKind::UnmatchedColumn => "unmatched_column",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected problem, positioned at a single cell.
///
/// Created once during a validation pass and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// 1-based data row; 0 addresses the header row (unmatched columns).
    pub line: usize,
    /// 1-based column index matching the original header order.
    pub column: usize,
    /// Question bound to the column, absent for unmatched columns.
    pub question_name: Option<String>,
    pub error_type: ErrorKind,
    /// Human-readable explanation naming the offending value and the
    /// expectation.
    pub error_explanation: String,
    /// Custom message from the schema, constraint violations only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_message: Option<String>,
}

impl ValidationError {
    /// Report ordering key: row-major, then column order.
    pub fn position_key(&self) -> (usize, usize) {
        (self.line, self.column)
    }
}

/// Outcome of one validation pass over a whole dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Build a result from an already-ordered error list.
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
