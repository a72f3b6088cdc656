//! Header matching: align spreadsheet columns to schema questions.

use xform_model::{ErrorKind, FormSchema, Question, SheetGrid, ValidationError};

/// One column of the dataset, bound to a question or unmatched.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnBinding<'a> {
    /// 1-based column index in header order.
    pub column: usize,
    pub question: Option<&'a Question>,
}

/// Map every column to a question by exact header text, name first, then
/// label.
///
/// Unmatched columns are non-fatal: each yields exactly one informational
/// notice at line 0 (the header row) and is skipped during row validation,
/// so the overall verdict stays driven by value-level errors.
pub(crate) fn match_headers<'a>(
    schema: &'a FormSchema,
    grid: &SheetGrid,
) -> (Vec<ColumnBinding<'a>>, Vec<ValidationError>) {
    let mut bindings = Vec::with_capacity(grid.headers.len());
    let mut notices = Vec::new();
    for (idx, header) in grid.headers.iter().enumerate() {
        let column = idx + 1;
        let question = schema.question_for_header(header);
        if question.is_none() {
            notices.push(ValidationError {
                line: 0,
                column,
                question_name: None,
                error_type: ErrorKind::UnmatchedColumn,
                error_explanation: format!(
                    "Column header '{header}' does not match any question name or label in the form"
                ),
                constraint_message: None,
            });
        }
        bindings.push(ColumnBinding { column, question });
    }

    // A required question with no column at all cannot raise per-row errors;
    // surface it in the log so the data loss is not silent.
    for question in schema.questions() {
        if question.required
            && !bindings
                .iter()
                .any(|binding| binding.question.is_some_and(|q| q.name == question.name))
        {
            tracing::warn!(
                question = %question.name,
                "required question has no matching column; its values cannot be checked"
            );
        }
    }

    (bindings, notices)
}
