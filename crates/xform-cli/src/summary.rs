//! Human-readable terminal output for validation results.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use xform_model::{ErrorKind, ValidationError};

use crate::commands::ValidateOutcome;

pub fn print_outcome(outcome: &ValidateOutcome, max_shown: usize) {
    let result = &outcome.result;
    if result.is_valid {
        println!("Validation passed: no errors found.");
    } else {
        print_error_table(&result.errors, max_shown);
        let cell_errors = result
            .errors
            .iter()
            .filter(|error| error.error_type != ErrorKind::UnmatchedColumn)
            .count();
        let notices = result.errors.len() - cell_errors;
        if notices > 0 {
            println!(
                "Validation failed: {cell_errors} cell error(s), {notices} unmatched column(s)."
            );
        } else {
            println!("Validation failed: {cell_errors} cell error(s).");
        }
    }
    if let Some(path) = &outcome.report_json {
        println!("Report: {}", path.display());
    }
    if let Some(paths) = &outcome.highlight {
        println!("Highlighted copy: {}", paths.data.display());
        println!("Error sheet: {}", paths.errors.display());
    }
}

fn print_error_table(errors: &[ValidationError], max_shown: usize) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        header_cell("Line"),
        header_cell("Column"),
        header_cell("Question"),
        header_cell("Error"),
        header_cell("Explanation"),
    ]);
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    for error in errors.iter().take(max_shown) {
        table.add_row(vec![
            Cell::new(error.line),
            Cell::new(error.column),
            Cell::new(error.question_name.as_deref().unwrap_or("-")),
            kind_cell(error.error_type),
            Cell::new(&error.error_explanation),
        ]);
    }
    println!("{table}");
    if errors.len() > max_shown {
        println!("... and {} more error(s).", errors.len() - max_shown);
    }
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn kind_cell(kind: ErrorKind) -> Cell {
    let color = match kind {
        ErrorKind::UnmatchedColumn => Color::Yellow,
        _ => Color::Red,
    };
    Cell::new(kind.as_str()).fg(color)
}
