//! Validation engine: single pass over the dataset, one error list out.
//!
//! Per cell the order is required -> type -> constraint, and a failure at
//! any step ends that cell's checks so one bad cell produces exactly one
//! error. A problem in one cell never aborts the rest of the pass.

use std::collections::BTreeMap;

use xform_model::{ErrorKind, FormSchema, Question, SheetGrid, ValidationError, ValidationResult};

use crate::checks::{Normalized, check_required, is_absent, validate_type};
use crate::error::EngineError;
use crate::expr::{CellState, EvalContext, evaluate};
use crate::header::{ColumnBinding, match_headers};

/// Validate a dataset against a form schema.
///
/// Pure function of its arguments: identical inputs produce an identical
/// report, errors ordered by `(line, column)`. The only fatal condition is
/// a grid whose rows disagree with the header width; everything else is
/// recorded as a per-cell error and the pass continues.
pub fn validate(schema: &FormSchema, grid: &SheetGrid) -> Result<ValidationResult, EngineError> {
    for (idx, row) in grid.rows.iter().enumerate() {
        if row.len() != grid.width() {
            return Err(EngineError::RaggedRow {
                line: idx + 1,
                expected: grid.width(),
                found: row.len(),
            });
        }
    }

    let (bindings, mut errors) = match_headers(schema, grid);

    // Rows are independent; each produces a local error list that is merged
    // and re-sorted, so a parallel split over rows could never change the
    // report order.
    for (row_idx, row) in grid.rows.iter().enumerate() {
        errors.extend(validate_row(schema, &bindings, row, row_idx + 1));
    }

    errors.sort_by_key(ValidationError::position_key);
    tracing::debug!(
        rows = grid.rows.len(),
        columns = grid.width(),
        errors = errors.len(),
        "validation pass complete"
    );
    Ok(ValidationResult::from_errors(errors))
}

fn validate_row(
    schema: &FormSchema,
    bindings: &[ColumnBinding<'_>],
    row: &[String],
    line: usize,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut states: BTreeMap<String, CellState> = BTreeMap::new();
    let mut constrained: Vec<(&Question, usize, &str, Normalized)> = Vec::new();

    // First pass: presence and type for every bound column, building the
    // normalized row context constraints will read.
    for binding in bindings {
        let Some(question) = binding.question else {
            continue;
        };
        let raw = row[binding.column - 1].as_str();

        if is_absent(raw) {
            if let Err(required) = check_required(question, raw) {
                errors.push(cell_error(
                    line,
                    binding.column,
                    question,
                    ErrorKind::ErrorValueRequired,
                    required.explanation,
                    None,
                ));
            }
            states.insert(question.name.clone(), CellState::Missing);
            continue;
        }

        match validate_type(question, raw, schema) {
            Ok(normalized) => {
                states.insert(question.name.clone(), CellState::Valid(normalized.clone()));
                if question.constraint.is_some() {
                    constrained.push((question, binding.column, raw, normalized));
                }
            }
            Err(mismatch) => {
                errors.push(cell_error(
                    line,
                    binding.column,
                    question,
                    ErrorKind::TypeMismatch,
                    mismatch.explanation,
                    None,
                ));
                states.insert(question.name.clone(), CellState::Invalid);
            }
        }
    }

    // Second pass: constraints, evaluated against the whole row's states so
    // sibling references see values from any column order. Evaluation
    // anomalies are fail-closed: they become reported constraint failures.
    for (question, column, raw, normalized) in constrained {
        let Some(expression) = question.constraint.as_deref() else {
            continue;
        };
        let ctx = EvalContext {
            schema,
            candidate: &normalized,
            candidate_raw: raw,
            row: &states,
        };
        match evaluate(expression, &ctx) {
            Ok(true) => {}
            Ok(false) => errors.push(cell_error(
                line,
                column,
                question,
                ErrorKind::ErrorConstraintUnsatisfied,
                format!("Constraint '{expression}' is not satisfied for value '{raw}'"),
                question.constraint_message.clone(),
            )),
            Err(error) => errors.push(cell_error(
                line,
                column,
                question,
                ErrorKind::ErrorConstraintUnsatisfied,
                format!(
                    "Constraint '{expression}' could not be evaluated for value '{raw}': {error}"
                ),
                question.constraint_message.clone(),
            )),
        }
    }

    errors
}

fn cell_error(
    line: usize,
    column: usize,
    question: &Question,
    error_type: ErrorKind,
    error_explanation: String,
    constraint_message: Option<String>,
) -> ValidationError {
    ValidationError {
        line,
        column,
        question_name: Some(question.name.clone()),
        error_type,
        error_explanation,
        constraint_message,
    }
}
