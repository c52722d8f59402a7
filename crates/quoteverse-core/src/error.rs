//! Error types for Quoteverse

use std::path::PathBuf;
use thiserror::Error;

/// Generic message shown to the user when a backend call fails.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "An error occurred while fetching quotes. Please try again later.";

#[derive(Debug, Error)]
pub enum QuoteverseError {
    // Backend errors
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Backend returned HTTP {status} for {endpoint}")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("Malformed backend response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    // Configuration errors
    #[error("Config file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Input errors
    #[error("Unknown search mode '{0}'. Use quote, author, or book")]
    UnknownSearchMode(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl QuoteverseError {
    /// Whether this error came from talking to the search backend.
    ///
    /// All backend failures collapse into one user-facing category; callers
    /// never retry them automatically.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            QuoteverseError::Transport { .. }
                | QuoteverseError::HttpStatus { .. }
                | QuoteverseError::MalformedResponse { .. }
        )
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        if self.is_transport_failure() {
            TRANSPORT_FAILURE_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<serde_json::Error> for QuoteverseError {
    fn from(err: serde_json::Error) -> Self {
        QuoteverseError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuoteverseError>;
