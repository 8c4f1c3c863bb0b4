//! Pipeline errors and non-fatal error collection.

use super::error_code::{self, FrictionErrorCode};
use super::{ConfigError, DomainError, EngineError, ParseError, ProfileError, StorageError};

/// Errors that can occur during a pipeline phase.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Domain analysis error: {0}")]
    Domain(#[from] DomainError),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Pipeline cancelled")]
    Cancelled,
}

impl FrictionErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(e) => e.error_code(),
            Self::Engine(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Profile(e) => e.error_code(),
            Self::Domain(e) => e.error_code(),
            Self::Io { .. } => error_code::IO_ERROR,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

/// Result of a pipeline phase that accumulates non-fatal errors.
/// Partial results are returned even when some games or moves fail.
#[derive(Debug, Default)]
pub struct PipelineResult<T: Default = ()> {
    /// The phase summary.
    pub data: T,
    /// Non-fatal errors collected during the run.
    pub errors: Vec<PipelineError>,
    /// Set when the run stopped early on a cancellation request.
    pub cancelled: bool,
}

impl<T: Default> PipelineResult<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
            cancelled: false,
        }
    }

    /// Add a non-fatal error to the result.
    pub fn add_error(&mut self, error: PipelineError) {
        self.errors.push(error);
    }

    /// Returns true if there are no non-fatal errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
