//! Declared-type validation of a single cell.
//!
//! Blank cells never reach this module; absence is adjudicated by the
//! required checker. Unknown declared types pass through unchecked so an
//! unimplemented type never blocks a sheet.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use xform_model::{FormSchema, Question, QuestionType};

/// Type-normalized cell value handed to the constraint evaluator.
///
/// Numeric questions normalize to numbers so constraint comparisons are not
/// string comparisons; everything else normalizes to canonical text.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl Normalized {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Normalized::Integer(value) => Some(*value as f64),
            Normalized::Decimal(value) => Some(*value),
            Normalized::Text(_) => None,
        }
    }
}

/// A failed type check, with the explanation for the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    pub explanation: String,
}

/// Validate non-blank raw text against the question's declared type.
///
/// The returned value is the normalized form: parsed number for numeric
/// types, canonical choice value for selects, canonical ISO text for
/// temporal types, the raw text otherwise.
pub fn validate_type(
    question: &Question,
    raw: &str,
    schema: &FormSchema,
) -> Result<Normalized, TypeMismatch> {
    let trimmed = raw.trim();
    match &question.question_type {
        QuestionType::Integer => match trimmed.parse::<i64>() {
            Ok(value) => Ok(Normalized::Integer(value)),
            Err(_) => Err(mismatch(format!(
                "Value '{raw}' is not a valid integer for question '{}'",
                question.name
            ))),
        },
        QuestionType::Decimal => match parse_decimal(trimmed) {
            Some(value) => Ok(Normalized::Decimal(value)),
            None => Err(mismatch(format!(
                "Value '{raw}' is not a valid decimal for question '{}'",
                question.name
            ))),
        },
        QuestionType::SelectOne(list_name) => {
            let Some(list) = schema.choice_list(list_name) else {
                // Unknown list: degrade to free text rather than fail the cell.
                return Ok(Normalized::Text(trimmed.to_string()));
            };
            match list.resolve(trimmed) {
                Some(canonical) => Ok(Normalized::Text(canonical.to_string())),
                None => Err(mismatch(format!(
                    "Value '{raw}' is not a valid choice for select_one question '{}' \
                     (valid choices: {})",
                    question.name,
                    join_choices(list.values()),
                ))),
            }
        }
        QuestionType::SelectMultiple(list_name) => {
            let Some(list) = schema.choice_list(list_name) else {
                return Ok(Normalized::Text(trimmed.to_string()));
            };
            let mut canonical = Vec::new();
            for token in trimmed.split_whitespace() {
                match list.resolve(token) {
                    Some(value) => canonical.push(value.to_string()),
                    None => {
                        return Err(mismatch(format!(
                            "Value '{token}' is not a valid choice for select_multiple \
                             question '{}' (valid choices: {})",
                            question.name,
                            join_choices(list.values()),
                        )));
                    }
                }
            }
            Ok(Normalized::Text(canonical.join(" ")))
        }
        QuestionType::Date => parse_date(trimmed).map(Normalized::Text).ok_or_else(|| {
            mismatch(format!(
                "Value '{raw}' is not a valid date (YYYY-MM-DD) for question '{}'",
                question.name
            ))
        }),
        QuestionType::Time => parse_time(trimmed).map(Normalized::Text).ok_or_else(|| {
            mismatch(format!(
                "Value '{raw}' is not a valid time (HH:MM[:SS]) for question '{}'",
                question.name
            ))
        }),
        QuestionType::DateTime => parse_datetime(trimmed).map(Normalized::Text).ok_or_else(|| {
            mismatch(format!(
                "Value '{raw}' is not a valid datetime (YYYY-MM-DDTHH:MM:SS) for question '{}'",
                question.name
            ))
        }),
        QuestionType::Text | QuestionType::Unknown(_) => Ok(Normalized::Text(trimmed.to_string())),
    }
}

fn mismatch(explanation: String) -> TypeMismatch {
    TypeMismatch { explanation }
}

fn join_choices<'a>(values: impl Iterator<Item = &'a str>) -> String {
    const MAX_LISTED: usize = 10;
    let all: Vec<&str> = values.collect();
    if all.len() > MAX_LISTED {
        format!("{}, ...", all[..MAX_LISTED].join(", "))
    } else {
        all.join(", ")
    }
}

/// Locale-independent decimal parse: optional sign, base-10 digits, at most
/// one period, no separators or exponents.
fn parse_decimal(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned.is_empty() || unsigned.matches('.').count() > 1 {
        return None;
    }
    if !unsigned.chars().all(|ch| ch.is_ascii_digit() || ch == '.') {
        return None;
    }
    if !unsigned.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Accepted date forms: `YYYY-MM-DD`, or a datetime whose date portion is
/// taken as the canonical value.
fn parse_date(text: &str) -> Option<String> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date().format("%Y-%m-%d").to_string())
}

fn parse_time(text: &str) -> Option<String> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
        .map(|time| time.format("%H:%M:%S").to_string())
}

fn parse_datetime(text: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}
