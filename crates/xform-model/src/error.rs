use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("duplicate question name in schema: {0}")]
    DuplicateQuestion(String),
    #[error("duplicate choice value '{value}' in list '{list_name}'")]
    DuplicateChoice { list_name: String, value: String },
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
