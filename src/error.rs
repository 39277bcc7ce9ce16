//! Error types for the Mifiel SDK.
//!
//! Every operation returns [`Result<T>`]. Argument and state checks fail
//! before any request is sent; transport and HTTP failures are surfaced
//! as-is, nothing is retried.

use thiserror::Error;

/// Result type for Mifiel operations.
pub type Result<T> = std::result::Result<T, MifielError>;

/// Errors that can occur when using the Mifiel SDK.
#[derive(Error, Debug)]
pub enum MifielError {
    /// A caller-supplied argument was rejected before any I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The resource has no id yet, so the named action has no URL to hit.
    #[error("Cannot {0} a resource without an id")]
    MissingId(&'static str),

    /// Authentication rejected by the API.
    #[error("Unauthorized: invalid app id or secret key")]
    Unauthorized,

    /// Non-success response from the Mifiel API.
    #[error("API error ({status_code}): {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A successful response whose body was not a JSON object.
    #[error("Decode error: {0}")]
    Decode(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MifielError {
    /// Returns true if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            MifielError::Unauthorized | MifielError::Api { status_code: 403, .. }
        )
    }

    /// Returns the HTTP status code if available.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            MifielError::Api { status_code, .. } => Some(*status_code),
            MifielError::Unauthorized => Some(401),
            MifielError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
