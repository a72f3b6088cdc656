//! Presence check for required questions.
//!
//! Runs before type and constraint checks; an absent required cell
//! short-circuits the rest so one blank never produces two errors.

use xform_model::Question;

/// A required question whose cell is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredError {
    pub explanation: String,
}

/// A cell is absent when it trims to the empty string.
pub fn is_absent(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Check presence for a required question.
///
/// Non-required questions never fail here; their blank cells are skipped
/// entirely by the caller.
pub fn check_required(question: &Question, raw: &str) -> Result<(), RequiredError> {
    if question.required && is_absent(raw) {
        return Err(RequiredError {
            explanation: format!("Value is required for question '{}'", question.name),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xform_model::QuestionType;

    #[test]
    fn whitespace_only_counts_as_absent() {
        assert!(is_absent(""));
        assert!(is_absent("   \t"));
        assert!(!is_absent(" 0 "));
    }

    #[test]
    fn required_question_rejects_blank() {
        let question = Question::new("age", QuestionType::Integer).required(true);
        let error = check_required(&question, "  ").unwrap_err();
        assert_eq!(error.explanation, "Value is required for question 'age'");
        assert!(check_required(&question, "30").is_ok());
    }

    #[test]
    fn optional_question_accepts_blank() {
        let question = Question::new("notes", QuestionType::Text);
        assert!(check_required(&question, "").is_ok());
    }
}
