//! Claims carried by a validation token.

use serde::{Deserialize, Serialize};

/// Claims of a verified validation token.
///
/// Only the claims the verifier acts on are modeled; the notification
/// service includes others (`nbf`, `nonce`, ...) that ride along in the
/// signed payload but carry no meaning here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationTokenClaims {
    /// Audience — the application id the notification subscription was
    /// created with.
    pub aud: String,

    /// Issuer — the tenant's token authority.
    pub iss: String,

    /// Expiration time (seconds since epoch).
    pub exp: i64,

    /// Subject, when present. Identifies the notification publisher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Authorized party, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
}

impl ValidationTokenClaims {
    /// Create claims for a given audience/issuer/expiry triple.
    pub fn new(aud: impl Into<String>, iss: impl Into<String>, exp: i64) -> Self {
        Self {
            aud: aud.into(),
            iss: iss.into(),
            exp,
            sub: None,
            azp: None,
        }
    }
}
