//! JWKS (JSON Web Key Set) wire models for the token authority's
//! published signing keys.

use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// A set of published signing keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkSet {
    /// The keys, in publication order.
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Find a key by its key id.
    #[must_use]
    pub fn find_key(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }

    /// Find a key suitable for signature verification.
    ///
    /// With a kid, matches by kid. Without one, returns the first RSA key
    /// published for signing (or with no declared use).
    #[must_use]
    pub fn find_signing_key(&self, kid: Option<&str>) -> Option<&Jwk> {
        match kid {
            Some(kid) => self.find_key(kid),
            None => self.keys.iter().find(|k| k.is_rsa() && k.is_signing_key()),
        }
    }
}

/// A single published key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type (`RSA`, `EC`, ...).
    pub kty: String,

    /// Declared key use (`sig`, `enc`).
    #[serde(rename = "use")]
    pub use_: Option<String>,

    /// Key id.
    pub kid: Option<String>,

    /// Algorithm (`RS256`).
    pub alg: Option<String>,

    /// RSA modulus, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA public exponent, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    /// X.509 certificate thumbprint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x5t: Option<String>,
}

impl Jwk {
    /// Whether this is an RSA key.
    #[must_use]
    pub fn is_rsa(&self) -> bool {
        self.kty == "RSA"
    }

    /// Whether the key may be used for signature verification.
    #[must_use]
    pub fn is_signing_key(&self) -> bool {
        self.use_.is_none() || self.use_.as_deref() == Some("sig")
    }

    /// Build a verification key from the RSA components.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidKey`] if the key is not RSA, is missing
    /// components, or the components do not parse.
    pub fn decoding_key(&self) -> AuthResult<DecodingKey> {
        if !self.is_rsa() {
            return Err(AuthError::InvalidKey(format!(
                "unsupported key type {}",
                self.kty
            )));
        }

        let n = self
            .n
            .as_deref()
            .ok_or_else(|| AuthError::InvalidKey("missing RSA modulus".to_string()))?;
        let e = self
            .e
            .as_deref()
            .ok_or_else(|| AuthError::InvalidKey("missing RSA exponent".to_string()))?;

        DecodingKey::from_rsa_components(n, e)
            .map_err(|err| AuthError::InvalidKey(format!("bad RSA components: {err}")))
    }
}
