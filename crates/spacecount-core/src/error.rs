//! Error types for Spacecount Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// The space carries a time zone name that is not a known IANA identifier
    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),

    /// A timestamp could not be parsed as ISO-8601
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A time range request could not be resolved to concrete instants
    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
