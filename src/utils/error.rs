//! Error Handling
//!
//! Unified error types for the crate.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors (missing paths, unusable identities)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Subprocess spawn/wait errors
    #[error("Process error: {0}")]
    Process(String),

    /// A subprocess exceeded its configured deadline and was killed
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Language-model call errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// HTTP transport errors (auto-converted from reqwest::Error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for crate errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a process error
    pub fn process(msg: impl Into<String>) -> Self {
        Self::Process(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
