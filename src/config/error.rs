//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid listen address: {0}")]
    InvalidListenAddress(String),

    #[error("Token secret must be at least {0} bytes in production")]
    WeakTokenSecret(usize),

    #[error("Mailbox capacity must be between 1 and {0}")]
    InvalidMailboxCapacity(usize),

    #[error("Shutdown drain timeout must be between 1 and {0} seconds")]
    InvalidDrainTimeout(u64),
}
