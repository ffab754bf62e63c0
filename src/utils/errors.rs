use thiserror::Error;

use crate::api::NetworkFailure;
use crate::config::ConfigError;

/// Failure that ends a command
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Portal request failed: {0}")]
    Network(#[from] NetworkFailure),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Usage(String),
}

/// One line for the operator, without the variant prefix of nested errors
pub fn clean_error(error: &AppError) -> String {
    match error {
        AppError::Network(NetworkFailure::Status { code, message }) if message.is_empty() => {
            format!("Portal answered HTTP {}", code)
        }
        AppError::Network(failure) => failure.to_string(),
        other => other.to_string(),
    }
}
