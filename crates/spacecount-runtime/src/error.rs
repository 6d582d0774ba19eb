//! Runtime error types

use spacecount_core::CoreError;
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The request never produced a response (network failure, client setup)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response body was not what the endpoint promises
    #[error("Decode error: {0}")]
    Decode(String),

    /// Aggregation was asked to build a report from zero buckets
    #[error("No buckets to aggregate")]
    EmptyInput,

    /// Time zone, timestamp or range error from the core helpers
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl RuntimeError {
    /// Whether this error came from the transport (network, status, body)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RuntimeError::Transport(_) | RuntimeError::Status { .. } | RuntimeError::Decode(_)
        )
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
