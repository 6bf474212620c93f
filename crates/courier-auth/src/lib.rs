//! Validation-token verification for inbound change notifications.
//!
//! The remote notification service attaches bearer validation tokens (RS256
//! JWTs) to batches that carry resource data. This crate verifies them
//! against the issuing authority's published signing keys: signature via a
//! TTL-cached JWKS fetch, audience against the registered application id,
//! issuer against the tenant's token authority, and the validity window.
//!
//! The verification surface is deliberately boolean — the batch policy is
//! all-or-nothing, so callers only care whether every token checks out.
//! Individual failure kinds are still logged for audit trails.

mod claims;
mod error;
mod jwks;
mod keys;
mod verifier;

pub use claims::ValidationTokenClaims;
pub use error::{AuthError, AuthResult};
pub use jwks::{Jwk, JwkSet};
pub use keys::{KeySetCache, DEFAULT_KEY_TTL};
pub use verifier::{TokenVerifier, VerifierConfig, DEFAULT_JWKS_URI};
