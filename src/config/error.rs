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

    #[error("Invalid remote base URL: must start with http:// or https://")]
    InvalidRemoteUrl,

    #[error("Remote timeout must be between 1 and 120 seconds")]
    InvalidTimeout,

    #[error("Remote max_retries exceeds maximum allowed (10)")]
    TooManyRetries,

    #[error("User id must not be blank")]
    BlankUserId,

    #[error("Invalid log filter directive: {0}")]
    InvalidLogLevel(String),
}
