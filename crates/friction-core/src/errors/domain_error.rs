//! Errors from the file-fed cross-domain analyses.

use super::error_code::{self, FrictionErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Cannot read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid CSV header: {message}")]
    Header { message: String },

    #[error("Missing required column {column}")]
    MissingColumn { column: &'static str },

    #[error("Invalid JSON at line {line}: {message}")]
    Json { line: usize, message: String },

    #[error("Not enough {domain} data: {message}")]
    InsufficientData { domain: &'static str, message: String },
}

impl FrictionErrorCode for DomainError {
    fn error_code(&self) -> &'static str {
        error_code::DOMAIN_ERROR
    }
}
