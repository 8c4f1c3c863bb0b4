//! FrictionErrorCode trait for the CLI boundary.

/// Every error enum implements this to expose a stable code string.
pub trait FrictionErrorCode {
    /// Returns the error code string (e.g., "ENGINE_START_FAILED").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const ILLEGAL_MOVE: &str = "ILLEGAL_MOVE";
pub const ARCHIVE_ERROR: &str = "ARCHIVE_ERROR";
pub const ENGINE_START_FAILED: &str = "ENGINE_START_FAILED";
pub const ENGINE_ERROR: &str = "ENGINE_ERROR";
pub const ENGINE_TERMINATED: &str = "ENGINE_TERMINATED";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const PROFILE_ERROR: &str = "PROFILE_ERROR";
pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
pub const IO_ERROR: &str = "IO_ERROR";
pub const CANCELLED: &str = "CANCELLED";
