//! Error types for Chatty
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.
//!
//! The first group of variants is the request taxonomy surfaced to the user
//! in the error banner; their `Display` output is the user-facing message.

use thiserror::Error;

/// Main error type for Chatty operations
#[derive(Error, Debug)]
pub enum ChattyError {
    /// No credential was available when a request was attempted
    #[error("Missing API key: set GEMINI_API_KEY, pass --api-key, or use /key <value>")]
    MissingCredential,

    /// The prompt was empty after trimming whitespace
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    /// The provider answered with a non-success status
    #[error("{message}")]
    Http {
        /// HTTP status code returned by the provider
        status: u16,
        /// Provider-supplied error message, or a generic fallback
        message: String,
    },

    /// The provider answered with a body that lacks the expected shape
    #[error("Unexpected response format from Gemini API: {0}")]
    MalformedResponse(String),

    /// The request could not complete (connect, DNS, reset, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The request was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid YAML for `Config`
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl ChattyError {
    /// Build an `Http` error from a status code and an optional provider message
    ///
    /// Blank provider messages fall back to the generic status text.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatty::error::ChattyError;
    ///
    /// let err = ChattyError::http(503, None);
    /// assert_eq!(err.to_string(), "Request failed with status code 503");
    ///
    /// let err = ChattyError::http(400, Some("API key not valid".to_string()));
    /// assert_eq!(err.to_string(), "API key not valid");
    /// ```
    pub fn http(status: u16, provider_message: Option<String>) -> Self {
        let message = provider_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {}", status));
        Self::Http { status, message }
    }
}

/// Result type alias for Chatty operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
