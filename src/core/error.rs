use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhasegateError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}
