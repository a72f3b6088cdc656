//! Annotated copy of the dataset with invalid cells flagged.
//!
//! CSV carries no cell styling, so the flag is textual: every cell named by
//! an error's `(line, column)` coordinate is wrapped in `>>`..`<<` markers
//! in a copy of the grid. A companion `<stem>_errors.csv` sheet lists every
//! error in report order.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::Writer;

use xform_model::{SheetGrid, ValidationError};

pub const HIGHLIGHT_OPEN: &str = ">>";
pub const HIGHLIGHT_CLOSE: &str = "<<";

/// Paths produced by [`write_highlighted_copy`].
#[derive(Debug, Clone)]
pub struct HighlightPaths {
    /// Annotated copy of the input grid.
    pub data: PathBuf,
    /// Error listing sheet.
    pub errors: PathBuf,
}

/// Write an annotated copy of `grid` plus an error sheet next to it.
///
/// Cells are located strictly by each error's `(line, column)`: line 0 is
/// the header row, data rows are 1-based. Coordinates outside the grid are
/// ignored rather than failing the whole export.
pub fn write_highlighted_copy(
    grid: &SheetGrid,
    errors: &[ValidationError],
    output: &Path,
) -> Result<HighlightPaths> {
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory: {}", parent.display()))?;
    }

    let mut headers = grid.headers.clone();
    let mut rows = grid.rows.clone();
    for error in errors {
        let Some(cell) = locate_mut(&mut headers, &mut rows, error.line, error.column) else {
            continue;
        };
        *cell = format!("{HIGHLIGHT_OPEN}{cell}{HIGHLIGHT_CLOSE}");
    }

    let mut writer = Writer::from_path(output)
        .with_context(|| format!("write highlighted copy: {}", output.display()))?;
    writer.write_record(&headers)?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    let errors_path = errors_sheet_path(output);
    write_errors_sheet(&errors_path, errors)?;

    Ok(HighlightPaths {
        data: output.to_path_buf(),
        errors: errors_path,
    })
}

fn locate_mut<'a>(
    headers: &'a mut [String],
    rows: &'a mut [Vec<String>],
    line: usize,
    column: usize,
) -> Option<&'a mut String> {
    if column == 0 {
        return None;
    }
    let col_idx = column - 1;
    if line == 0 {
        return headers.get_mut(col_idx);
    }
    rows.get_mut(line - 1)?.get_mut(col_idx)
}

fn errors_sheet_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "highlighted".to_string());
    output.with_file_name(format!("{stem}_errors.csv"))
}

fn write_errors_sheet(path: &Path, errors: &[ValidationError]) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("write errors sheet: {}", path.display()))?;
    writer.write_record([
        "Line",
        "Column",
        "Question",
        "Error Type",
        "Explanation",
        "Constraint Message",
    ])?;
    for error in errors {
        writer.write_record([
            error.line.to_string(),
            error.column.to_string(),
            error.question_name.clone().unwrap_or_default(),
            error.error_type.as_str().to_string(),
            error.error_explanation.clone(),
            error.constraint_message.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
