//! Error types for the notification pipeline.

use thiserror::Error;

/// Errors raised by pipeline collaborators outside the decryption and
/// enrichment paths.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The subscription store failed to answer a lookup.
    #[error("Subscription store error: {0}")]
    Store(String),

    /// The configured private key material could not be used.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),
}

/// Failure kinds of the encrypted-content protocol.
///
/// Each failure is terminal for the notification that carried the content;
/// sibling notifications in the batch are unaffected.
#[derive(Debug, Error)]
pub enum DecryptError {
    /// Base64, ciphertext, padding, or payload structure was invalid at
    /// some step of the protocol.
    #[error("Malformed encrypted content: {0}")]
    Malformed(String),

    /// The wrapped symmetric key could not be recovered with the configured
    /// private key.
    #[error("Symmetric key unwrap failed")]
    KeyUnwrapFailed,

    /// The keyed signature over the ciphertext did not verify. The
    /// ciphertext is never decrypted on this path.
    #[error("Content signature verification failed")]
    SignatureInvalid,
}

/// Errors from the enrichment fetch collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote resource does not exist (or is not visible).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The upstream call failed for any other reason.
    #[error("Resource fetch failed: {0}")]
    Upstream(String),
}
