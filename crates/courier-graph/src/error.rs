//! Error types for the resource-graph client.

use thiserror::Error;

/// Result type alias using [`GraphError`].
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur when calling the resource graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// OAuth2 authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Graph API error response.
    #[error("Graph API error: {code} - {message}")]
    Api { code: String, message: String },

    /// Resource not found (or not visible to the application).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate-limit retries exhausted.
    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },
}
