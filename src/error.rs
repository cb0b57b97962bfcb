//! Error types for the IT Manager dashboard core

use thiserror::Error;

/// Message shown when the API cannot be reached at all
pub const NETWORK_MESSAGE: &str = "Cannot reach the server API.";

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Request could not be sent or no response was received
    #[error("Network error: {0}")]
    Network(String),

    /// Response received with a non-success status
    #[error("API error ({status}): {}", message.as_deref().unwrap_or("<no message>"))]
    Api { status: u16, message: Option<String> },

    /// Success status but the body did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Session corrupted: {0}")]
    SessionCorruption(String),

    /// A mutating operation is already in flight on the same controller
    #[error("Busy: {0}")]
    Busy(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// Text to show the user for this error.
    ///
    /// Server-supplied messages are passed through verbatim; `fallback` is used
    /// when the server said nothing useful.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Network(_) => NETWORK_MESSAGE.to_string(),
            AppError::Api { message: Some(msg), .. } if !msg.trim().is_empty() => msg.clone(),
            AppError::Api { .. } | AppError::UnexpectedResponse(_) => fallback.to_string(),
            AppError::Validation(msg) | AppError::Authorization(msg) | AppError::Busy(msg) => {
                msg.clone()
            }
            AppError::SessionCorruption(_) => {
                "Your saved session was invalid. Please sign in again.".to_string()
            }
            AppError::Storage(_) | AppError::Serialization(_) | AppError::Config(_) => {
                fallback.to_string()
            }
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, AppError::Network(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AppError::UnexpectedResponse(e.to_string())
        } else if let Some(status) = e.status() {
            AppError::Api {
                status: status.as_u16(),
                message: None,
            }
        } else {
            AppError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
