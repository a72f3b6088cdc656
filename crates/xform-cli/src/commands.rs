//! Command implementations.

use std::path::PathBuf;

use anyhow::{Context, Result};

use xform_ingest::{load_form_schema, read_sheet_grid};
use xform_model::ValidationResult;
use xform_report::{HighlightPaths, write_highlighted_copy, write_report_json};
use xform_validate::validate;

use crate::cli::ValidateArgs;

/// Everything `validate` produced, for the summary printer.
pub struct ValidateOutcome {
    pub result: ValidationResult,
    pub report_json: Option<PathBuf>,
    pub highlight: Option<HighlightPaths>,
}

pub fn run_validate(args: &ValidateArgs) -> Result<ValidateOutcome> {
    let schema = load_form_schema(&args.survey, &args.choices).context("load form schema")?;
    let grid =
        read_sheet_grid(&args.data).with_context(|| format!("read {}", args.data.display()))?;

    tracing::info!(
        questions = schema.questions().len(),
        rows = grid.rows.len(),
        columns = grid.width(),
        "validating dataset"
    );

    let result = validate(&schema, &grid).context("dataset failed structural checks")?;

    let report_json = match &args.report_json {
        Some(path) => Some(write_report_json(path, &result)?),
        None => None,
    };
    let highlight = match &args.highlight {
        Some(path) => Some(write_highlighted_copy(&grid, &result.errors, path)?),
        None => None,
    };

    Ok(ValidateOutcome {
        result,
        report_json,
        highlight,
    })
}
