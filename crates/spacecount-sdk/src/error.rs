//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Fetch or aggregation error
    #[error("Runtime error: {0}")]
    Runtime(#[from] spacecount_runtime::RuntimeError),

    /// Time zone or time range error
    #[error("Core error: {0}")]
    Core(#[from] spacecount_core::CoreError),

    /// The API returned data that does not decode into the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
