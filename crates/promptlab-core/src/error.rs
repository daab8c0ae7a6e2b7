//! Error types for the prompt lab

use thiserror::Error;

/// Result type alias for prompt lab operations
pub type LabResult<T> = Result<T, LabError>;

/// Main error type for the prompt lab
#[derive(Error, Debug, Clone)]
pub enum LabError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Text generation errors
    #[error("Generation error: {0}")]
    Generation(String),

    /// Trace recording errors
    #[error("Trace error: {0}")]
    Trace(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation timed out
    #[error("Operation timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl LabError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a new trace recording error
    pub fn trace(message: impl Into<String>) -> Self {
        Self::Trace(message.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new timeout error
    pub const fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }
}

impl From<anyhow::Error> for LabError {
    fn from(error: anyhow::Error) -> Self {
        Self::Other(error.to_string())
    }
}

impl From<std::io::Error> for LabError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for LabError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<reqwest::Error> for LabError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}
