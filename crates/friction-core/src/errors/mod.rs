//! Error handling for the friction pipeline.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod domain_error;
pub mod engine_error;
pub mod error_code;
pub mod parse_error;
pub mod pipeline_error;
pub mod profile_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use domain_error::DomainError;
pub use engine_error::EngineError;
pub use error_code::FrictionErrorCode;
pub use parse_error::ParseError;
pub use pipeline_error::{PipelineError, PipelineResult};
pub use profile_error::ProfileError;
pub use storage_error::StorageError;
