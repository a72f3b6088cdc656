//! Serialization contract tests for the report value objects.

use xform_model::{ErrorKind, ValidationError, ValidationResult};

fn sample_error(line: usize, column: usize, kind: ErrorKind) -> ValidationError {
    ValidationError {
        line,
        column,
        question_name: Some("age".to_string()),
        error_type: kind,
        error_explanation: "Value 'thirty' is not a valid integer for question 'age'".to_string(),
        constraint_message: None,
    }
}

#[test]
fn validation_error_serializes_wire_fields() {
    let error = sample_error(1, 2, ErrorKind::TypeMismatch);
    let json = serde_json::to_value(&error).expect("serialize");
    assert_eq!(json["line"], 1);
    assert_eq!(json["column"], 2);
    assert_eq!(json["question_name"], "age");
    assert_eq!(json["error_type"], "type_mismatch");
    assert!(json["error_explanation"].as_str().unwrap().contains("thirty"));
    // Absent constraint messages are omitted from the wire form.
    assert!(json.get("constraint_message").is_none());
}

#[test]
fn constraint_message_survives_round_trip() {
    let mut error = sample_error(3, 1, ErrorKind::ErrorConstraintUnsatisfied);
    error.constraint_message = Some("Age must be positive".to_string());
    let json = serde_json::to_string(&error).expect("serialize");
    let round: ValidationError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(round, error);
}

#[test]
fn result_validity_tracks_error_list() {
    let empty = ValidationResult::from_errors(vec![]);
    assert!(empty.is_valid);
    assert_eq!(empty.error_count(), 0);

    let failed = ValidationResult::from_errors(vec![sample_error(
        1,
        1,
        ErrorKind::ErrorValueRequired,
    )]);
    assert!(!failed.is_valid);
    assert_eq!(failed.error_count(), 1);
}

#[test]
fn errors_order_by_row_then_column() {
    let mut errors = vec![
        sample_error(2, 1, ErrorKind::TypeMismatch),
        sample_error(1, 3, ErrorKind::TypeMismatch),
        sample_error(1, 2, ErrorKind::ErrorValueRequired),
    ];
    errors.sort_by_key(ValidationError::position_key);
    let keys: Vec<(usize, usize)> = errors.iter().map(ValidationError::position_key).collect();
    assert_eq!(keys, vec![(1, 2), (1, 3), (2, 1)]);
}
