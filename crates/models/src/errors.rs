use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
}

impl ModelError {
    pub fn missing(field: &str) -> Self { Self::Validation(format!("missing required field: {field}")) }
}
