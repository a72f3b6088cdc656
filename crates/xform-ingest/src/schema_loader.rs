//! Schema loading from XLSForm survey/choices sheets.
//!
//! One CSV file per sheet. Survey columns: `type`, `name`, `label`,
//! `required`, `constraint`, `constraint_message`. Choices columns:
//! `list_name`, `name`, `label`, `alias`. Column order is free; lookup is
//! by header text.

use std::path::Path;

use anyhow::{Context, Result, bail};

use xform_model::{Choice, FormSchema, Question, QuestionType, SheetGrid};

use crate::sheet::read_sheet_grid;

/// Load a [`FormSchema`] from survey and choices sheets.
///
/// Rows without both `name` and `type` (survey) or both `list_name` and
/// `name` (choices) are skipped, matching how form authors leave group
/// separators and notes in the sheet. Duplicate question names or choice
/// pairs are rejected here, before any validation run.
pub fn load_form_schema(survey_path: &Path, choices_path: &Path) -> Result<FormSchema> {
    let survey = read_sheet_grid(survey_path)
        .with_context(|| format!("load survey sheet: {}", survey_path.display()))?;
    let choices = read_sheet_grid(choices_path)
        .with_context(|| format!("load choices sheet: {}", choices_path.display()))?;
    build_form_schema(&survey, &choices)
}

/// Build a schema from already-read survey and choices grids.
pub fn build_form_schema(survey: &SheetGrid, choices: &SheetGrid) -> Result<FormSchema> {
    let questions = parse_survey(survey)?;
    let choice_rows = parse_choices(choices);
    tracing::info!(
        questions = questions.len(),
        choices = choice_rows.len(),
        "loaded form schema"
    );
    FormSchema::new(questions, choice_rows).context("build form schema")
}

struct SurveyColumns {
    q_type: usize,
    name: usize,
    label: Option<usize>,
    required: Option<usize>,
    constraint: Option<usize>,
    constraint_message: Option<usize>,
}

fn column_index(grid: &SheetGrid, header: &str) -> Option<usize> {
    grid.headers.iter().position(|value| value == header)
}

fn parse_survey(survey: &SheetGrid) -> Result<Vec<Question>> {
    let columns = SurveyColumns {
        q_type: match column_index(survey, "type") {
            Some(idx) => idx,
            None => bail!("survey sheet has no 'type' column"),
        },
        name: match column_index(survey, "name") {
            Some(idx) => idx,
            None => bail!("survey sheet has no 'name' column"),
        },
        label: column_index(survey, "label"),
        required: column_index(survey, "required"),
        constraint: column_index(survey, "constraint"),
        constraint_message: column_index(survey, "constraint_message"),
    };

    let cell = |row: &[String], idx: Option<usize>| -> Option<String> {
        idx.and_then(|idx| row.get(idx))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let mut questions = Vec::new();
    for row in &survey.rows {
        let Some(name) = cell(row, Some(columns.name)) else {
            continue;
        };
        let Some(raw_type) = cell(row, Some(columns.q_type)) else {
            continue;
        };
        // Group markers structure the form but take no answers.
        if raw_type.starts_with("begin ") || raw_type.starts_with("end ") {
            continue;
        }
        let mut question = Question::new(name, QuestionType::parse(&raw_type));
        if let Some(label) = cell(row, columns.label) {
            question = question.with_label(label);
        }
        if let Some(required) = cell(row, columns.required) {
            question = question.required(required.eq_ignore_ascii_case("yes"));
        }
        if let Some(constraint) = cell(row, columns.constraint) {
            question = question.with_constraint(constraint);
        }
        if let Some(message) = cell(row, columns.constraint_message) {
            question = question.with_constraint_message(message);
        }
        questions.push(question);
    }
    Ok(questions)
}

fn parse_choices(choices: &SheetGrid) -> Vec<Choice> {
    let list_name_idx = column_index(choices, "list_name");
    let name_idx = column_index(choices, "name");
    let label_idx = column_index(choices, "label");
    let alias_idx = column_index(choices, "alias");

    let cell = |row: &[String], idx: Option<usize>| -> Option<String> {
        idx.and_then(|idx| row.get(idx))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let mut parsed = Vec::new();
    for row in &choices.rows {
        let (Some(list_name), Some(value)) = (cell(row, list_name_idx), cell(row, name_idx))
        else {
            continue;
        };
        let mut choice = Choice::new(list_name, value);
        if let Some(label) = cell(row, label_idx) {
            choice.label = Some(label);
        }
        if let Some(alias) = cell(row, alias_idx) {
            choice = choice.with_alias(alias);
        }
        parsed.push(choice);
    }
    parsed
}
