//! Error types for the Babel environment layer.

use babel_core::ValidationError;
use thiserror::Error;

/// Errors that can occur while serving library requests.
#[derive(Debug, Error)]
pub enum EnvError {
    /// A newer request superseded this one, or it was cancelled explicitly
    #[error("Request cancelled")]
    Cancelled,

    /// Operation timed out
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// The compute task panicked or was dropped by the runtime
    #[error("Task failed: {0}")]
    Task(String),

    /// The request named invalid coordinates
    #[error("Invalid request: {0}")]
    Library(#[from] ValidationError),
}

impl EnvError {
    /// Creates a task error.
    pub fn task(msg: impl std::fmt::Display) -> Self {
        Self::Task(msg.to_string())
    }
}
