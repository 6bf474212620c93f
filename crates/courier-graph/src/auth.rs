//! OAuth2 client-credentials token acquisition with caching.

use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::config::{GraphConfig, GraphCredentials};
use crate::error::{GraphError, GraphResult};

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// An acquired access token and its expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// True once the token is inside the refresh grace window.
    fn needs_refresh(&self, grace: Duration) -> bool {
        Utc::now() + grace >= self.expires_at
    }
}

/// Caches application access tokens, refreshing ahead of expiry.
#[derive(Debug)]
pub struct TokenCache {
    credentials: GraphCredentials,
    token_url: String,
    scope: String,
    http_client: reqwest::Client,
    cached: Arc<RwLock<Option<CachedToken>>>,
    grace: Duration,
}

impl TokenCache {
    /// Create a token cache for the configured tenant.
    pub fn new(config: &GraphConfig, credentials: GraphCredentials) -> Self {
        Self {
            credentials,
            token_url: config.token_url(),
            scope: config.default_scope(),
            http_client: reqwest::Client::new(),
            cached: Arc::new(RwLock::new(None)),
            grace: Duration::minutes(5),
        }
    }

    /// Return a valid access token, acquiring or refreshing as needed.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> GraphResult<String> {
        {
            let cached = self.cached.read().await;
            if let Some(ref token) = *cached {
                if !token.needs_refresh(self.grace) {
                    debug!("Using cached access token");
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("Acquiring access token");
        let fresh = self.acquire().await?;
        let access_token = fresh.access_token.clone();

        let mut cached = self.cached.write().await;
        *cached = Some(fresh);

        Ok(access_token)
    }

    /// Drop the cached token, forcing acquisition on next use.
    pub async fn invalidate(&self) {
        let mut cached = self.cached.write().await;
        *cached = None;
    }

    /// Client-credentials grant against the token endpoint.
    async fn acquire(&self) -> GraphResult<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            (
                "client_secret",
                self.credentials.client_secret.expose_secret().as_str(),
            ),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| GraphError::Auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::Auth(format!(
                "token request returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GraphError::Auth(format!("bad token response: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(token.expires_in);
        debug!(%expires_at, "Access token acquired");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}
