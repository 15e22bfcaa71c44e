//! Error types for power management.

use thiserror::Error;

/// Errors that can occur while configuring the power manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowerError {
    /// Invalid configuration.
    #[error("Invalid power configuration: {0}")]
    InvalidConfiguration(String),
}

impl PowerError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// A specialized `Result` type for power operations.
pub type PowerResult<T> = Result<T, PowerError>;
