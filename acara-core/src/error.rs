//! Error types for the acara ecosystem.

use thiserror::Error;

/// Errors that can occur in acara operations.
#[derive(Error, Debug)]
pub enum AcaraError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("OTP delivery failed: {0}")]
    Delivery(String),

    #[error("Invalid OTP: {0}")]
    InvalidOtp(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for AcaraError {
    fn from(err: reqwest::Error) -> Self {
        AcaraError::Network(err.to_string())
    }
}

/// Result type alias for acara operations.
pub type AcaraResult<T> = Result<T, AcaraError>;
