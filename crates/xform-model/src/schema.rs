//! Immutable form schema: questions, declared types, and choice lists.
//!
//! A `FormSchema` is built once by the schema loader and passed by reference
//! into every validation call. Construction enforces the structural
//! invariants the validation engine relies on: question names are unique,
//! and `(list_name, value)` choice pairs are unique.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Declared question type from the survey sheet.
///
/// The set is closed; declared types outside it map to `Unknown`, which is
/// validated as free text so unimplemented types degrade gracefully instead
/// of blocking a whole sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    Text,
    Integer,
    Decimal,
    Date,
    Time,
    DateTime,
    /// `select_one <list_name>`
    SelectOne(String),
    /// `select_multiple <list_name>`, cell holds space-separated values
    SelectMultiple(String),
    /// Unrecognized declared type, kept verbatim for diagnostics.
    Unknown(String),
}

impl QuestionType {
    /// Parse a declared type string from a survey sheet.
    ///
    /// Select types carry their list name after a space, e.g.
    /// `select_one sex`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "text" => QuestionType::Text,
            "integer" => QuestionType::Integer,
            "decimal" => QuestionType::Decimal,
            "date" => QuestionType::Date,
            "time" => QuestionType::Time,
            "datetime" | "dateTime" => QuestionType::DateTime,
            _ => {
                if let Some(list) = trimmed.strip_prefix("select_one ") {
                    return QuestionType::SelectOne(list.trim().to_string());
                }
                if let Some(list) = trimmed.strip_prefix("select_multiple ") {
                    return QuestionType::SelectMultiple(list.trim().to_string());
                }
                QuestionType::Unknown(trimmed.to_string())
            }
        }
    }

    /// List name referenced by select types.
    pub fn list_name(&self) -> Option<&str> {
        match self {
            QuestionType::SelectOne(list) | QuestionType::SelectMultiple(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Integer => "integer",
            QuestionType::Decimal => "decimal",
            QuestionType::Date => "date",
            QuestionType::Time => "time",
            QuestionType::DateTime => "datetime",
            QuestionType::SelectOne(_) => "select_one",
            QuestionType::SelectMultiple(_) => "select_multiple",
            QuestionType::Unknown(raw) => raw,
        }
    }
}

/// A single survey question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier, matched case-sensitively against column headers.
    pub name: String,
    /// Display label; a column header matching the label also binds to this
    /// question when no name matches.
    pub label: Option<String>,
    pub question_type: QuestionType,
    /// When true, a blank cell is an error.
    pub required: bool,
    /// Constraint expression over the candidate value (`.`) and sibling
    /// question references (`${name}`).
    pub constraint: Option<String>,
    /// Custom message attached to constraint violations.
    pub constraint_message: Option<String>,
}

impl Question {
    pub fn new(name: impl Into<String>, question_type: QuestionType) -> Self {
        Self {
            name: name.into(),
            label: None,
            question_type,
            required: false,
            constraint: None,
            constraint_message: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    #[must_use]
    pub fn with_constraint_message(mut self, message: impl Into<String>) -> Self {
        self.constraint_message = Some(message.into());
        self
    }
}

/// One entry of a choice list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub list_name: String,
    /// Canonical stored value; what a spreadsheet cell must contain.
    pub value: String,
    /// Display text, never used for matching.
    pub label: Option<String>,
    /// Alternate spellings that resolve to `value`.
    pub aliases: Vec<String>,
}

impl Choice {
    pub fn new(list_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            list_name: list_name.into(),
            value: value.into(),
            label: None,
            aliases: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// A named choice list with a case-insensitive value/alias lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChoiceList {
    pub name: String,
    pub choices: Vec<Choice>,
    /// Lowercased value or alias -> canonical value.
    lookup: BTreeMap<String, String>,
}

impl ChoiceList {
    /// Resolve a raw cell value to the canonical choice value.
    ///
    /// Matching is case-insensitive over both values and aliases.
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        self.lookup
            .get(&raw.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Canonical values in declaration order, for error messages.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.choices.iter().map(|choice| choice.value.as_str())
    }
}

/// Fully loaded, immutable form schema.
///
/// Shared read-only across validation calls; the engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSchema {
    questions: Vec<Question>,
    by_name: BTreeMap<String, usize>,
    by_label: BTreeMap<String, usize>,
    choice_lists: BTreeMap<String, ChoiceList>,
}

impl FormSchema {
    /// Build a schema, rejecting duplicate question names and duplicate
    /// `(list_name, value)` choice pairs.
    pub fn new(questions: Vec<Question>, choices: Vec<Choice>) -> Result<Self, ModelError> {
        let mut by_name = BTreeMap::new();
        let mut by_label = BTreeMap::new();
        for (idx, question) in questions.iter().enumerate() {
            if by_name.insert(question.name.clone(), idx).is_some() {
                return Err(ModelError::DuplicateQuestion(question.name.clone()));
            }
        }
        // Labels bind after names; a label shadowed by another question's
        // name is ignored at header-matching time, not here.
        for (idx, question) in questions.iter().enumerate() {
            if let Some(label) = &question.label {
                by_label.entry(label.clone()).or_insert(idx);
            }
        }

        let mut choice_lists: BTreeMap<String, ChoiceList> = BTreeMap::new();
        for choice in choices {
            let list = choice_lists
                .entry(choice.list_name.clone())
                .or_insert_with(|| ChoiceList {
                    name: choice.list_name.clone(),
                    ..ChoiceList::default()
                });
            let key = choice.value.to_lowercase();
            if list.lookup.contains_key(&key) {
                return Err(ModelError::DuplicateChoice {
                    list_name: choice.list_name.clone(),
                    value: choice.value.clone(),
                });
            }
            list.lookup.insert(key, choice.value.clone());
            for alias in &choice.aliases {
                list.lookup
                    .entry(alias.to_lowercase())
                    .or_insert_with(|| choice.value.clone());
            }
            list.choices.push(choice);
        }

        Ok(Self {
            questions,
            by_name,
            by_label,
            choice_lists,
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Look up a question by its unique name (case-sensitive).
    pub fn question(&self, name: &str) -> Option<&Question> {
        self.by_name.get(name).map(|&idx| &self.questions[idx])
    }

    /// Resolve a column header to a question, by name first, then by label.
    pub fn question_for_header(&self, header: &str) -> Option<&Question> {
        self.by_name
            .get(header)
            .or_else(|| self.by_label.get(header))
            .map(|&idx| &self.questions[idx])
    }

    pub fn choice_list(&self, name: &str) -> Option<&ChoiceList> {
        self.choice_lists.get(name)
    }
}
