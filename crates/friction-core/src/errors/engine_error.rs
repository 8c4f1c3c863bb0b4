//! Engine process and evaluation errors.

use super::error_code::{self, FrictionErrorCode};

/// Errors from launching or talking to the analysis engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to start engine {path}: {message}")]
    StartFailed { path: String, message: String },

    #[error("Engine I/O error: {message}")]
    Io { message: String },

    #[error("Engine protocol error: {message}")]
    Protocol { message: String },

    #[error("Engine process terminated unexpectedly")]
    Terminated,

    #[error("Engine returned no usable lines for {fen}")]
    EmptyAnalysis { fen: String },

    #[error("Invalid position {fen}: {message}")]
    InvalidPosition { fen: String, message: String },
}

impl FrictionErrorCode for EngineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::StartFailed { .. } => error_code::ENGINE_START_FAILED,
            Self::Terminated => error_code::ENGINE_TERMINATED,
            _ => error_code::ENGINE_ERROR,
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}
