//! File-level loader tests.

use std::io::Write;

use tempfile::TempDir;
use xform_ingest::{load_form_schema, read_sheet_grid};
use xform_model::QuestionType;

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create");
    file.write_all(content.as_bytes()).expect("write");
    path
}

#[test]
fn loads_schema_and_grid_from_disk() {
    let dir = TempDir::new().expect("tempdir");
    let survey = write_file(
        &dir,
        "survey.csv",
        "type,name,label,required,constraint\n\
         integer,age,Age,yes,. >= 0\n\
         select_one sex,sex,Sex,,\n",
    );
    let choices = write_file(
        &dir,
        "choices.csv",
        "list_name,name,label\nsex,m,Male\nsex,f,Female\n",
    );
    let data = write_file(&dir, "data.csv", "age,sex\n30,m\n41,f\n");

    let schema = load_form_schema(&survey, &choices).expect("schema");
    assert_eq!(schema.questions().len(), 2);
    assert_eq!(
        schema.question("sex").map(|q| q.question_type.clone()),
        Some(QuestionType::SelectOne("sex".to_string()))
    );

    let grid = read_sheet_grid(&data).expect("grid");
    assert_eq!(grid.headers, vec!["age", "sex"]);
    assert_eq!(grid.rows.len(), 2);
}
