pub mod error;
pub mod report;
pub mod schema;
pub mod table;

pub use error::{ModelError, Result};
pub use report::{ErrorKind, ValidationError, ValidationResult};
pub use schema::{Choice, ChoiceList, FormSchema, Question, QuestionType};
pub use table::SheetGrid;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_type_parses_select_lists() {
        assert_eq!(
            QuestionType::parse("select_one sex"),
            QuestionType::SelectOne("sex".to_string())
        );
        assert_eq!(
            QuestionType::parse("select_multiple symptoms"),
            QuestionType::SelectMultiple("symptoms".to_string())
        );
        assert_eq!(QuestionType::parse("integer"), QuestionType::Integer);
        assert_eq!(
            QuestionType::parse("barcode"),
            QuestionType::Unknown("barcode".to_string())
        );
    }

    #[test]
    fn schema_rejects_duplicate_question_names() {
        let questions = vec![
            Question::new("age", QuestionType::Integer),
            Question::new("age", QuestionType::Text),
        ];
        let error = FormSchema::new(questions, vec![]).unwrap_err();
        assert!(matches!(error, ModelError::DuplicateQuestion(name) if name == "age"));
    }

    #[test]
    fn schema_rejects_duplicate_choice_pairs() {
        let choices = vec![Choice::new("sex", "m"), Choice::new("sex", "m")];
        let error = FormSchema::new(vec![], choices).unwrap_err();
        assert!(matches!(
            error,
            ModelError::DuplicateChoice { list_name, value } if list_name == "sex" && value == "m"
        ));
    }

    #[test]
    fn choice_lookup_is_case_insensitive_and_alias_aware() {
        let choices = vec![
            Choice::new("sex", "m").with_alias("male"),
            Choice::new("sex", "f").with_alias("female"),
        ];
        let schema = FormSchema::new(vec![], choices).expect("schema");
        let list = schema.choice_list("sex").expect("list");
        assert_eq!(list.resolve("M"), Some("m"));
        assert_eq!(list.resolve("Female"), Some("f"));
        assert_eq!(list.resolve("x"), None);
    }

    #[test]
    fn header_resolution_prefers_names_over_labels() {
        let questions = vec![
            Question::new("age", QuestionType::Integer).with_label("Age in years"),
            Question::new("Age in years", QuestionType::Text),
        ];
        let schema = FormSchema::new(questions, vec![]).expect("schema");
        let question = schema.question_for_header("Age in years").expect("bound");
        assert_eq!(question.question_type, QuestionType::Text);
        assert_eq!(
            schema.question_for_header("age").map(|q| q.name.as_str()),
            Some("age")
        );
    }

    #[test]
    fn error_kind_wire_values() {
        let json = serde_json::to_string(&ErrorKind::ErrorValueRequired).expect("serialize");
        assert_eq!(json, "\"error_value_required\"");
        let kind: ErrorKind = serde_json::from_str("\"type_mismatch\"").expect("deserialize");
        assert_eq!(kind, ErrorKind::TypeMismatch);
        assert_eq!(
            ErrorKind::UnmatchedColumn.to_string(),
            "unmatched_column".to_string()
        );
    }

    #[test]
    fn grid_cell_addressing_matches_report_coordinates() {
        let grid = SheetGrid::new(
            vec!["age".to_string(), "sex".to_string()],
            vec![vec!["30".to_string(), "m".to_string()]],
        );
        assert_eq!(grid.cell(0, 1), Some("age"));
        assert_eq!(grid.cell(1, 2), Some("m"));
        assert_eq!(grid.cell(1, 3), None);
        assert_eq!(grid.cell(2, 1), None);
        assert_eq!(grid.cell(1, 0), None);
    }
}
