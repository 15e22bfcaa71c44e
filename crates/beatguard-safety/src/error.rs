//! Error types for the safety manager and firmware configuration.

use beatguard_power::PowerError;
use beatguard_tasks::TaskError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building the safety manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SafetyError {
    /// Invalid configuration.
    #[error("Invalid safety configuration: {0}")]
    InvalidConfiguration(String),
}

impl SafetyError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Errors raised while loading a [`FirmwareConfig`](crate::FirmwareConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read configuration from {path}: {source}")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON for the schema.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The safety section is invalid.
    #[error(transparent)]
    Safety(#[from] SafetyError),

    /// The power section is invalid.
    #[error(transparent)]
    Power(#[from] PowerError),

    /// A task preset is invalid.
    #[error(transparent)]
    Tasks(#[from] TaskError),
}

/// A specialized `Result` type for safety operations.
pub type SafetyResult<T> = Result<T, SafetyError>;

/// A specialized `Result` type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
