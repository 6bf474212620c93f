//! Error types for validation-token verification.

use thiserror::Error;

/// Result type alias using [`AuthError`].
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur while verifying a validation token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The signing-key set could not be retrieved.
    #[error("Key set fetch failed: {0}")]
    KeySetFetch(String),

    /// No signing key matched the token's key id.
    #[error("No signing key found for kid {0:?}")]
    KeyNotFound(Option<String>),

    /// The key material could not be used for verification.
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    /// The token is malformed or failed a structural check.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The token signature did not verify.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// The token is outside its validity window.
    #[error("Token expired")]
    TokenExpired,

    /// The token audience does not match the registered application.
    #[error("Token audience mismatch")]
    InvalidAudience,

    /// The token issuer is not the tenant's token authority.
    #[error("Token issuer mismatch: {0}")]
    InvalidIssuer(String),

    /// The token uses an algorithm other than RS256.
    #[error("Unsupported token algorithm")]
    InvalidAlgorithm,
}
