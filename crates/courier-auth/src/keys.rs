//! TTL-cached retrieval of the token authority's signing keys.
//!
//! The authority publishes its keys at a well-known JWKS endpoint and
//! rotates them on its own schedule. Verification is hot-path, so the set
//! is cached and only re-fetched after the TTL lapses or on an explicit
//! refresh (key miss after rotation).

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::error::{AuthError, AuthResult};
use crate::jwks::JwkSet;

/// Default TTL for a cached key set.
pub const DEFAULT_KEY_TTL: Duration = Duration::from_secs(600);

/// A fetched key set with its fetch time.
#[derive(Debug, Clone)]
struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

impl CachedKeys {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() > ttl
    }
}

/// Cache over a single JWKS endpoint.
#[derive(Debug, Clone)]
pub struct KeySetCache {
    jwks_uri: String,
    ttl: Duration,
    http_client: reqwest::Client,
    cached: Arc<RwLock<Option<CachedKeys>>>,
}

impl KeySetCache {
    /// Create a cache for the given JWKS endpoint with the default TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeySetFetch`] if the HTTP client cannot be
    /// built.
    pub fn new(jwks_uri: impl Into<String>) -> AuthResult<Self> {
        Self::with_ttl(jwks_uri, DEFAULT_KEY_TTL)
    }

    /// Create a cache with a custom TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeySetFetch`] if the HTTP client cannot be
    /// built.
    pub fn with_ttl(jwks_uri: impl Into<String>, ttl: Duration) -> AuthResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AuthError::KeySetFetch(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            jwks_uri: jwks_uri.into(),
            ttl,
            http_client,
            cached: Arc::new(RwLock::new(None)),
        })
    }

    /// The endpoint this cache reads from.
    #[must_use]
    pub fn jwks_uri(&self) -> &str {
        &self.jwks_uri
    }

    /// Return the cached key set, fetching if absent or expired.
    #[instrument(skip(self), fields(jwks_uri = %self.jwks_uri))]
    pub async fn get(&self) -> AuthResult<JwkSet> {
        {
            let cached = self.cached.read().await;
            if let Some(ref entry) = *cached {
                if !entry.is_expired(self.ttl) {
                    debug!("Key set cache hit");
                    return Ok(entry.keys.clone());
                }
            }
        }

        debug!("Key set cache miss, fetching");
        self.fetch_and_cache().await
    }

    /// Fetch fresh keys, bypassing the cache. Used after a kid miss, which
    /// usually means the authority rotated keys inside the TTL window.
    #[instrument(skip(self), fields(jwks_uri = %self.jwks_uri))]
    pub async fn refresh(&self) -> AuthResult<JwkSet> {
        debug!("Forcing key set refresh");
        self.fetch_and_cache().await
    }

    /// Drop the cached entry.
    pub async fn invalidate(&self) {
        let mut cached = self.cached.write().await;
        *cached = None;
    }

    async fn fetch_and_cache(&self) -> AuthResult<JwkSet> {
        let keys = self.fetch_keys().await?;

        let mut cached = self.cached.write().await;
        *cached = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });

        Ok(keys)
    }

    async fn fetch_keys(&self) -> AuthResult<JwkSet> {
        let response = self
            .http_client
            .get(&self.jwks_uri)
            .send()
            .await
            .map_err(|e| AuthError::KeySetFetch(format!("HTTP error: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::KeySetFetch(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::KeySetFetch(format!("JSON parse error: {e}")))?;

        if keys.keys.is_empty() {
            warn!(jwks_uri = %self.jwks_uri, "Authority returned an empty key set");
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_jwks() -> String {
        r#"{
            "keys": [
                {
                    "kty": "RSA",
                    "use": "sig",
                    "kid": "key-1",
                    "alg": "RS256",
                    "n": "uOs2bjkrVK1Vi6uSrZAGjy_YTQlC0eMz4YLJHVDgdXM",
                    "e": "AQAB"
                }
            ]
        }"#
        .to_string()
    }

    async fn mock_jwks(server: &MockServer, expect: u64) {
        Mock::given(method("GET"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sample_jwks()))
            .expect(expect)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn fetches_and_caches() {
        let server = MockServer::start().await;
        mock_jwks(&server, 1).await;

        let cache = KeySetCache::new(format!("{}/keys", server.uri())).unwrap();

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();
        assert_eq!(first.keys.len(), 1);
        assert_eq!(second.keys.len(), 1);
    }

    #[tokio::test]
    async fn refresh_bypasses_cache() {
        let server = MockServer::start().await;
        mock_jwks(&server, 2).await;

        let cache = KeySetCache::new(format!("{}/keys", server.uri())).unwrap();
        cache.get().await.unwrap();
        cache.refresh().await.unwrap();
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let server = MockServer::start().await;
        mock_jwks(&server, 2).await;

        let cache = KeySetCache::new(format!("{}/keys", server.uri())).unwrap();
        cache.get().await.unwrap();
        cache.invalidate().await;
        cache.get().await.unwrap();
    }

    #[tokio::test]
    async fn upstream_failure_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let cache = KeySetCache::new(format!("{}/keys", server.uri())).unwrap();
        let result = cache.get().await;
        assert!(matches!(result, Err(AuthError::KeySetFetch(_))));
    }
}
